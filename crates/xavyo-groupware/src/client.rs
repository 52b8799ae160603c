//! Groupware SOAP client (reqwest-based).
//!
//! [`GroupwareClient::send`] is the single entry point for remote calls: it
//! renders an [`Operation`], posts it, classifies failures and retries the
//! transient ones according to the configured [`RetryPolicy`].

use crate::auth::Credentials;
use crate::config::GroupwareConfig;
use crate::error::{GroupwareError, GroupwareResult};
use crate::fault::{extract_fault_string, FaultClassifier};
use crate::ids::ContextId;
use crate::operation::{Operation, RequestContext};
use crate::retry::RetryPolicy;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, error};

const SOAP_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// HTTP client for the groupware admin web services.
#[derive(Debug, Clone)]
pub struct GroupwareClient {
    /// Base URL without trailing slash.
    endpoint: String,
    context_id: ContextId,
    credentials: Credentials,
    retry: RetryPolicy,
    classifier: FaultClassifier,
    http_client: Client,
}

impl GroupwareClient {
    /// Create a client from configuration.
    pub fn new(config: &GroupwareConfig) -> GroupwareResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("xavyo-groupware/1.0")
            .build()?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(config: &GroupwareConfig, http_client: Client) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            context_id: config.context.id.clone(),
            credentials: config.credentials.clone(),
            retry: config.retry.clone(),
            classifier: FaultClassifier::default(),
            http_client,
        }
    }

    /// Replace the fault classification table.
    #[must_use]
    pub fn with_classifier(mut self, classifier: FaultClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    /// Execute `operation`, retrying transient failures.
    pub async fn send<O: Operation>(&self, operation: &O) -> GroupwareResult<O::Output> {
        let ctx = RequestContext {
            context_id: &self.context_id,
            credentials: &self.credentials,
        };
        let body = operation.build_request(&ctx);
        let url = format!("{}/webservices/{}", self.endpoint, O::SERVICE.path());
        let soap_action = O::soap_action();

        self.retry
            .execute(O::NAME, || self.attempt(operation, &url, &soap_action, &body))
            .await
    }

    /// One HTTP round trip with exactly one classification of its outcome.
    async fn attempt<O: Operation>(
        &self,
        operation: &O,
        url: &str,
        soap_action: &str,
        body: &str,
    ) -> GroupwareResult<O::Output> {
        debug!(operation = O::NAME, url, "Groupware request");

        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", soap_action)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return operation.parse_response(&text);
        }

        Err(self.failure(O::NAME, status.as_u16(), &text))
    }

    /// Map an error response to the error for this attempt.
    fn failure(&self, operation: &'static str, status: u16, body: &str) -> GroupwareError {
        match extract_fault_string(body) {
            Err(reason) => {
                error!(
                    operation,
                    status,
                    reason = %reason,
                    "Groupware response could not be parsed"
                );
                GroupwareError::ResponseUnparseable(reason)
            }
            Ok(Some(fault)) => self
                .classifier
                .classify(&fault)
                .unwrap_or(GroupwareError::Fault(fault)),
            Ok(None) => GroupwareError::EmptyFault { status },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupwareConfigBuilder;

    fn client() -> GroupwareClient {
        let config = GroupwareConfigBuilder::default()
            .endpoint("http://localhost:8080/")
            .context("10", "ctx10")
            .credentials("oxadmin", "secret")
            .default_user_password("initial")
            .build()
            .unwrap();
        GroupwareClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_is_normalized() {
        assert_eq!(client().endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_classified_fault_maps_to_typed_error() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultstring>Member already exists in group</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        assert!(matches!(
            client().failure("AddMember", 500, body),
            GroupwareError::MemberAlreadyInGroup(_)
        ));
    }

    #[test]
    fn test_unknown_fault_is_retryable() {
        let body = r#"<Envelope><Body><Fault><faultstring>database unavailable</faultstring></Fault></Body></Envelope>"#;
        let error = client().failure("AddMember", 500, body);
        assert!(matches!(error, GroupwareError::Fault(ref f) if f == "database unavailable"));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        let client = client();
        assert!(matches!(
            client.failure("AddMember", 503, ""),
            GroupwareError::EmptyFault { status: 503 }
        ));
        assert!(matches!(
            client.failure("AddMember", 500, "<Envelope><Body>"),
            GroupwareError::ResponseUnparseable(_)
        ));
    }
}
