//! Error types for groupware provisioning.
//!
//! Errors are split into transient failures the dispatcher retries and
//! permanent ones that are returned to the caller immediately.

use thiserror::Error;
use xavyo_events::EventError;

/// Result alias used throughout the crate.
pub type GroupwareResult<T> = Result<T, GroupwareError>;

/// Errors that can occur while provisioning groupware accounts.
#[derive(Debug, Error)]
pub enum GroupwareError {
    // Transient errors (retried by the dispatcher)
    /// The HTTP call itself failed (connect, TLS, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The groupware system answered with a fault that is not classified.
    #[error("unclassified fault: {0}")]
    Fault(String),

    /// Error response without a fault string.
    #[error("error response without fault string (HTTP {status})")]
    EmptyFault { status: u16 },

    /// Retries exhausted.
    #[error("request failed after {attempts} attempt(s)")]
    RequestFailed { attempts: u32 },

    // Classified permanent faults
    /// The account is already a member of the group.
    #[error("member already exists in group: {0}")]
    MemberAlreadyInGroup(String),

    /// Primary mail and email1 of the account differ.
    #[error("primary mail must equal email1: {0}")]
    PrimaryMailMismatch(String),

    /// More than one group matched a name that must be unique.
    #[error("group name '{name}' is ambiguous ({matches} matches)")]
    GroupNameAmbiguous { name: String, matches: usize },

    // Undecodable responses
    /// An error response body could not be parsed at all.
    #[error("response could not be parsed: {0}")]
    ResponseUnparseable(String),

    /// A success response did not have the expected shape.
    #[error("unexpected response for {operation}: {reason}")]
    ResponseUndecodable {
        operation: &'static str,
        reason: String,
    },

    // Workflow preconditions
    /// The local person referenced by an event does not exist.
    #[error("person {0} not found")]
    PersonNotFound(String),

    /// The person has no username.
    #[error("person {0} has no username")]
    MissingUsername(String),

    /// No groupware account id is known for the person.
    #[error("no groupware account id known for person {0}")]
    MissingAccountId(String),

    /// No usable email address is known.
    #[error("no email address known for person {0}")]
    MissingEmailAddress(String),

    /// An account with the username already exists in the groupware system.
    #[error("groupware account '{0}' already exists")]
    AccountAlreadyExists(String),

    // Collaborators
    /// Reading or writing local state failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Publishing a follow-up event failed.
    #[error("publish failed: {0}")]
    Publish(#[from] EventError),

    // Configuration errors
    /// Required configuration variable is missing.
    #[error("configuration missing: {var}")]
    ConfigMissing { var: String },

    /// Configuration value is invalid.
    #[error("configuration invalid for {var}: {reason}")]
    ConfigInvalid { var: String, reason: String },
}

impl GroupwareError {
    /// Whether the dispatcher should re-issue the call after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GroupwareError::Transport(_)
                | GroupwareError::Fault(_)
                | GroupwareError::EmptyFault { .. }
        )
    }
}
