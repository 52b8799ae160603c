//! Groupware integration configuration.
//!
//! Loaded once at startup and never mutated afterwards; share it behind an
//! `Arc`.

use crate::auth::Credentials;
use crate::error::{GroupwareError, GroupwareResult};
use crate::ids::ContextId;
use crate::retry::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;

/// Tenant context every call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub id: ContextId,
    pub name: String,
}

/// Module access flags applied to every newly created account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleAccess {
    /// Hide the global address book from the account.
    pub global_address_book_disabled: bool,
    /// Grant access to the file store module.
    pub infostore: bool,
}

/// Complete configuration of the groupware integration.
#[derive(Debug, Clone)]
pub struct GroupwareConfig {
    /// Global switch; when off every lifecycle handler is a no-op.
    pub enabled: bool,
    /// Base URL of the groupware server, without the `/webservices` suffix.
    pub endpoint: String,
    pub context: ContextConfig,
    /// Administrative credentials sent with every call.
    pub credentials: Credentials,
    /// Initial password for newly created accounts.
    pub default_user_password: String,
    pub retry: RetryPolicy,
    /// Timeout of a single HTTP call.
    pub request_timeout: Duration,
    pub module_access: ModuleAccess,
}

impl GroupwareConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `GROUPWARE_ENDPOINT`: Base URL of the groupware server
    /// - `GROUPWARE_CONTEXT_ID`, `GROUPWARE_CONTEXT_NAME`: Tenant context
    /// - `GROUPWARE_USERNAME`, `GROUPWARE_PASSWORD`: Admin credentials
    /// - `GROUPWARE_USER_DEFAULT_PASSWORD`: Password for new accounts
    ///
    /// Optional:
    /// - `GROUPWARE_ENABLED`: `true`/`false` (default: false)
    /// - `GROUPWARE_RETRY_MAX_ATTEMPTS`: Total attempts per call (default: 3)
    /// - `GROUPWARE_RETRY_DELAY_MS`: Delay between attempts (default: 15000)
    /// - `GROUPWARE_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)
    /// - `GROUPWARE_GLOBAL_ADDRESS_BOOK_DISABLED`: (default: false)
    /// - `GROUPWARE_INFOSTORE`: (default: false)
    pub fn from_env() -> GroupwareResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> GroupwareResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str| {
            lookup(var).ok_or_else(|| GroupwareError::ConfigMissing {
                var: var.to_string(),
            })
        };

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy::new(
            parse_or(&lookup, "GROUPWARE_RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
            Duration::from_millis(parse_or(
                &lookup,
                "GROUPWARE_RETRY_DELAY_MS",
                u64::try_from(defaults.delay.as_millis()).unwrap_or(u64::MAX),
            )?),
        );
        check_attempts(&retry, "GROUPWARE_RETRY_MAX_ATTEMPTS")?;

        let module_defaults = ModuleAccess::default();

        Ok(Self {
            enabled: parse_or(&lookup, "GROUPWARE_ENABLED", false)?,
            endpoint: required("GROUPWARE_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            context: ContextConfig {
                id: ContextId::new(required("GROUPWARE_CONTEXT_ID")?),
                name: required("GROUPWARE_CONTEXT_NAME")?,
            },
            credentials: Credentials::new(
                required("GROUPWARE_USERNAME")?,
                required("GROUPWARE_PASSWORD")?,
            ),
            default_user_password: required("GROUPWARE_USER_DEFAULT_PASSWORD")?,
            retry,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GROUPWARE_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            module_access: ModuleAccess {
                global_address_book_disabled: parse_or(
                    &lookup,
                    "GROUPWARE_GLOBAL_ADDRESS_BOOK_DISABLED",
                    module_defaults.global_address_book_disabled,
                )?,
                infostore: parse_or(
                    &lookup,
                    "GROUPWARE_INFOSTORE",
                    module_defaults.infostore,
                )?,
            },
        })
    }

    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> GroupwareConfigBuilder {
        GroupwareConfigBuilder::new()
    }
}

fn check_attempts(retry: &RetryPolicy, var: &str) -> GroupwareResult<()> {
    if retry.max_attempts == 0 {
        return Err(GroupwareError::ConfigInvalid {
            var: var.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> GroupwareResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| GroupwareError::ConfigInvalid {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// Builder for `GroupwareConfig`.
#[derive(Debug, Default)]
pub struct GroupwareConfigBuilder {
    enabled: bool,
    endpoint: Option<String>,
    context: Option<ContextConfig>,
    credentials: Option<Credentials>,
    default_user_password: Option<String>,
    retry: Option<RetryPolicy>,
    request_timeout: Option<Duration>,
    module_access: Option<ModuleAccess>,
}

impl GroupwareConfigBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn context(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.context = Some(ContextConfig {
            id: ContextId::new(id),
            name: name.into(),
        });
        self
    }

    pub fn credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(login, password));
        self
    }

    pub fn default_user_password(mut self, password: impl Into<String>) -> Self {
        self.default_user_password = Some(password.into());
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn module_access(mut self, module_access: ModuleAccess) -> Self {
        self.module_access = Some(module_access);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GroupwareResult<GroupwareConfig> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| GroupwareError::ConfigMissing {
                var: "endpoint".to_string(),
            })?;
        let context = self.context.ok_or_else(|| GroupwareError::ConfigMissing {
            var: "context".to_string(),
        })?;
        let credentials = self
            .credentials
            .ok_or_else(|| GroupwareError::ConfigMissing {
                var: "credentials".to_string(),
            })?;
        let default_user_password = self.default_user_password.ok_or_else(|| {
            GroupwareError::ConfigMissing {
                var: "default_user_password".to_string(),
            }
        })?;
        let retry = self.retry.unwrap_or_default();
        check_attempts(&retry, "retry.max_attempts")?;

        Ok(GroupwareConfig {
            enabled: self.enabled,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            context,
            credentials,
            default_user_password,
            retry,
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(30)),
            module_access: self.module_access.unwrap_or_default(),
        })
    }
}
