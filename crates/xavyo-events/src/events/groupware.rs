//! Groupware account events.
//!
//! Published after a provisioning workflow against the groupware system
//! completed successfully.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Published when a groupware account has been created and placed in its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCreated {
    pub person_id: String,
    pub username: String,
    pub account_id: String,
    /// Username of the account in the groupware system.
    pub account_name: String,
    pub group_id: String,
    pub context_id: String,
    pub context_name: String,
    pub primary_email: String,
}

impl Event for AccountCreated {
    const TOPIC: &'static str = "xavyo.groupware.account.created";
    const EVENT_TYPE: &'static str = "xavyo.groupware.account.created";
}

/// Published when addresses, username or group memberships of an account changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountChanged {
    pub person_id: String,
    pub username: Option<String>,
    pub account_id: String,
    pub account_name: Option<String>,
    pub context_id: String,
    pub context_name: String,
    pub primary_email: Option<String>,
}

impl Event for AccountChanged {
    const TOPIC: &'static str = "xavyo.groupware.account.changed";
    const EVENT_TYPE: &'static str = "xavyo.groupware.account.changed";
}

/// Published when an account has been removed from its groups and deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDeleted {
    pub person_id: String,
    pub username: Option<String>,
    pub account_id: String,
    pub context_id: String,
    pub context_name: String,
}

impl Event for AccountDeleted {
    const TOPIC: &'static str = "xavyo.groupware.account.deleted";
    const EVENT_TYPE: &'static str = "xavyo.groupware.account.deleted";
}

/// Published when an alias has been detached from an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRemoved {
    pub person_id: String,
    pub username: String,
    pub account_id: String,
    pub context_id: String,
    pub context_name: String,
    pub removed_address: String,
    pub primary_email: Option<String>,
}

impl Event for AliasRemoved {
    const TOPIC: &'static str = "xavyo.groupware.alias.removed";
    const EVENT_TYPE: &'static str = "xavyo.groupware.alias.removed";
}
