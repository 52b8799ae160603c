//! Mock groupware SOAP server using wiremock.
//!
//! Mocks are matched on service path and `SOAPAction` header, optionally
//! narrowed by body fragments. Every received request is recorded so tests
//! can assert on call counts and call order.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, Request, ResponseTemplate};

use xavyo_groupware::{GroupwareClient, GroupwareConfig, RetryPolicy};

const SERVICE_NS: &str = "http://soap.admin.openexchange.com";
pub const USER_SERVICE: &str = "OXUserService";
pub const GROUP_SERVICE: &str = "OXGroupService";

/// Delay between attempts used by test clients.
pub const TEST_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Wrap a response element in a SOAP envelope.
pub fn soap_response(inner: &str) -> String {
    format!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{inner}</soap:Body></soap:Envelope>"#
    )
}

/// A SOAP fault body carrying `fault`.
pub fn soap_fault(fault: &str) -> String {
    soap_response(&format!(
        "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>{fault}</faultstring></soap:Fault>"
    ))
}

/// `<return>` element of one group.
pub fn group_xml(id: &str, name: &str) -> String {
    format!("<return><id>{id}</id><name>{name}</name><displayname>{name}</displayname></return>")
}

/// A recorded call as `{service}/{action}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub call: String,
    pub body: String,
}

pub struct MockGroupwareServer {
    server: MockServer,
}

impl MockGroupwareServer {
    pub async fn new() -> Self {
        super::init_test_logging();
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying server, for mounting custom mocks.
    pub fn mock_server(&self) -> &MockServer {
        &self.server
    }

    /// Enabled configuration pointing at this server.
    pub fn config(&self) -> GroupwareConfig {
        GroupwareConfig::builder()
            .enabled(true)
            .endpoint(self.uri())
            .context("10", "context10")
            .credentials("oxadmin", "secret")
            .default_user_password("initial")
            .retry(RetryPolicy::new(3, TEST_RETRY_DELAY))
            .build()
            .unwrap()
    }

    pub fn client(&self) -> Arc<GroupwareClient> {
        Arc::new(GroupwareClient::with_http_client(
            &self.config(),
            reqwest::Client::new(),
        ))
    }

    /// Matcher for one operation.
    pub fn given(service: &str, action: &str) -> MockBuilder {
        Mock::given(method("POST"))
            .and(path(format!("/webservices/{service}")))
            .and(header("SOAPAction", format!("{SERVICE_NS}/{action}").as_str()))
    }

    /// Answer `action` with a success response wrapping `inner`.
    pub async fn mock_ok(&self, service: &str, action: &str, inner: &str) {
        Self::given(service, action)
            .respond_with(ResponseTemplate::new(200).set_body_string(soap_response(inner)))
            .mount(&self.server)
            .await;
    }

    /// Like [`Self::mock_ok`], only for requests whose body contains `fragment`.
    pub async fn mock_ok_matching(&self, service: &str, action: &str, fragment: &str, inner: &str) {
        Self::given(service, action)
            .and(body_string_contains(fragment))
            .respond_with(ResponseTemplate::new(200).set_body_string(soap_response(inner)))
            .mount(&self.server)
            .await;
    }

    /// Answer `action` with a SOAP fault.
    pub async fn mock_fault(&self, service: &str, action: &str, fault: &str) {
        Self::given(service, action)
            .respond_with(ResponseTemplate::new(500).set_body_string(soap_fault(fault)))
            .mount(&self.server)
            .await;
    }

    /// Answer the next `times` calls of `action` with `template`; later calls
    /// fall through to mocks mounted afterwards.
    pub async fn mock_times(
        &self,
        service: &str,
        action: &str,
        times: u64,
        template: ResponseTemplate,
    ) {
        Self::given(service, action)
            .respond_with(template)
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    // ── Canned operations ────────────────────────────────────────────

    pub async fn mock_exists(&self, exists: bool) {
        self.mock_ok(
            USER_SERVICE,
            "exists",
            &format!("<existsResponse><return>{exists}</return></existsResponse>"),
        )
        .await;
    }

    pub async fn mock_create_account(&self, id: &str, username: &str, email: &str) {
        self.mock_ok(
            USER_SERVICE,
            "create",
            &format!(
                "<createResponse><return><id>{id}</id><name>{username}</name><primaryEmail>{email}</primaryEmail></return></createResponse>"
            ),
        )
        .await;
    }

    pub async fn mock_account_data(&self, id: &str, username: &str, primary: &str, aliases: &[&str]) {
        let aliases: String = aliases
            .iter()
            .map(|alias| format!("<aliases>{alias}</aliases>"))
            .collect();
        self.mock_ok(
            USER_SERVICE,
            "getData",
            &format!(
                "<getDataResponse><return><id>{id}</id><name>{username}</name><primaryEmail>{primary}</primaryEmail><email1>{primary}</email1>{aliases}</return></getDataResponse>"
            ),
        )
        .await;
    }

    pub async fn mock_change(&self) {
        self.mock_ok(USER_SERVICE, "change", "<changeResponse/>").await;
    }

    pub async fn mock_delete(&self) {
        self.mock_ok(USER_SERVICE, "delete", "<deleteResponse/>").await;
    }

    pub async fn mock_module_access(&self) {
        self.mock_ok(
            USER_SERVICE,
            "changeByModuleAccess",
            "<changeByModuleAccessResponse/>",
        )
        .await;
    }

    /// `list` answering with `groups` as `(id, name)` pairs.
    pub async fn mock_list_groups(&self, groups: &[(&str, &str)]) {
        let returns: String = groups.iter().map(|(id, name)| group_xml(id, name)).collect();
        self.mock_ok(
            GROUP_SERVICE,
            "list",
            &format!("<listResponse>{returns}</listResponse>"),
        )
        .await;
    }

    pub async fn mock_list_groups_for_user(&self, groups: &[(&str, &str)]) {
        let returns: String = groups.iter().map(|(id, name)| group_xml(id, name)).collect();
        self.mock_ok(
            GROUP_SERVICE,
            "listGroupsForUser",
            &format!("<listGroupsForUserResponse>{returns}</listGroupsForUserResponse>"),
        )
        .await;
    }

    pub async fn mock_create_group(&self, id: &str) {
        self.mock_ok(
            GROUP_SERVICE,
            "create",
            &format!("<createResponse><return><id>{id}</id></return></createResponse>"),
        )
        .await;
    }

    pub async fn mock_add_member(&self) {
        self.mock_ok(GROUP_SERVICE, "addMember", "<addMemberResponse/>")
            .await;
    }

    pub async fn mock_remove_member(&self) {
        self.mock_ok(GROUP_SERVICE, "removeMember", "<removeMemberResponse/>")
            .await;
    }

    // ── Recorded requests ────────────────────────────────────────────

    /// Every received request, in arrival order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(record)
            .collect()
    }

    /// `{service}/{action}` of every received request, in arrival order.
    pub async fn call_names(&self) -> Vec<String> {
        self.calls().await.into_iter().map(|c| c.call).collect()
    }

    /// Number of received requests for one operation.
    pub async fn count(&self, service: &str, action: &str) -> usize {
        let wanted = format!("{service}/{action}");
        self.call_names()
            .await
            .iter()
            .filter(|call| **call == wanted)
            .count()
    }
}

fn record(request: &Request) -> RecordedCall {
    let service = request
        .url
        .path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let action = request
        .headers
        .get("SOAPAction")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit('/').next())
        .unwrap_or_default()
        .to_string();

    RecordedCall {
        call: format!("{service}/{action}"),
        body: String::from_utf8_lossy(&request.body).into_owned(),
    }
}
