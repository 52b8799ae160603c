//! Email address lifecycle events.
//!
//! Published by the email service whenever an address of a person is
//! generated, replaced, disabled, deleted or purged.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a local email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailAddressStatus {
    Requested,
    Enabled,
    Disabled,
    Deactivated,
    Failed,
}

/// Published when a new address has been generated for a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressGenerated {
    pub person_id: String,
    /// Login name of the person, also used as the groupware username.
    pub username: String,
    pub email_address_id: String,
    pub address: String,
    pub is_primary: bool,
    /// Code of the organisation the address was generated for.
    pub org_code: String,
}

impl Event for EmailAddressGenerated {
    const TOPIC: &'static str = "xavyo.email.address.generated";
    const EVENT_TYPE: &'static str = "xavyo.email.address.generated";
}

/// Published when a person's primary address was replaced by a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressChanged {
    pub person_id: String,
    pub username: String,
    pub old_email_address_id: String,
    pub old_address: String,
    pub new_email_address_id: String,
    pub new_address: String,
    pub org_code: String,
}

impl Event for EmailAddressChanged {
    const TOPIC: &'static str = "xavyo.email.address.changed";
    const EVENT_TYPE: &'static str = "xavyo.email.address.changed";
}

/// Published when a person's address has been disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressDisabled {
    pub person_id: String,
    pub username: String,
}

impl Event for EmailAddressDisabled {
    const TOPIC: &'static str = "xavyo.email.address.disabled";
    const EVENT_TYPE: &'static str = "xavyo.email.address.disabled";
}

/// Published when address generation found an address that already exists,
/// so only the groupware side needs remediation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressAlreadyExists {
    pub person_id: String,
    pub org_code: String,
}

impl Event for EmailAddressAlreadyExists {
    const TOPIC: &'static str = "xavyo.email.address.already_exists";
    const EVENT_TYPE: &'static str = "xavyo.email.address.already_exists";
}

/// Published when all addresses of a person have been purged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressesPurged {
    pub person_id: String,
    pub username: String,
    /// Groupware account id of the person.
    pub account_id: String,
}

impl Event for EmailAddressesPurged {
    const TOPIC: &'static str = "xavyo.email.addresses.purged";
    const EVENT_TYPE: &'static str = "xavyo.email.addresses.purged";
}

/// Published when a single (non-primary) address has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddressDeleted {
    pub person_id: String,
    pub username: String,
    pub account_id: String,
    pub address_id: String,
    pub status: EmailAddressStatus,
    pub address: String,
}

impl Event for EmailAddressDeleted {
    const TOPIC: &'static str = "xavyo.email.address.deleted";
    const EVENT_TYPE: &'static str = "xavyo.email.address.deleted";
}
