//! Person lifecycle events.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Role a person holds within an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleKind {
    /// Teaching staff.
    Lehr,
    /// Learners.
    Lern,
    /// School management.
    Leit,
    Extern,
    Sysadmin,
}

impl RoleKind {
    /// Whether this role grants teaching-staff groupware access.
    #[must_use]
    pub fn is_teaching(self) -> bool {
        matches!(self, RoleKind::Lehr)
    }
}

/// Person data carried by kontext events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSnapshot {
    pub id: String,
    pub username: Option<String>,
    pub given_name: String,
    pub family_name: String,
}

/// A person's role at one organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KontextSnapshot {
    pub id: String,
    pub organisation_id: String,
    /// Organisation code; absent for organisations without one.
    pub organisation_code: Option<String>,
    pub role: RoleKind,
}

/// Published when a person has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDeleted {
    pub person_id: String,
    pub username: Option<String>,
    /// Primary address of the deleted person, if one was known.
    pub email_address: Option<String>,
}

impl Event for PersonDeleted {
    const TOPIC: &'static str = "xavyo.person.deleted";
    const EVENT_TYPE: &'static str = "xavyo.person.deleted";
}

/// Published when the set of kontexte of a person changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonenkontextUpdated {
    pub person: PersonSnapshot,
    /// Kontexte the person holds after the update.
    pub current_kontexte: Vec<KontextSnapshot>,
    #[serde(default)]
    pub removed_kontexte: Vec<KontextSnapshot>,
    #[serde(default)]
    pub new_kontexte: Vec<KontextSnapshot>,
}

impl Event for PersonenkontextUpdated {
    const TOPIC: &'static str = "xavyo.person.kontext.updated";
    const EVENT_TYPE: &'static str = "xavyo.person.kontext.updated";
}

/// Published when the grace period after a kontext deletion has expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDeletedAfterDeadlineExceeded {
    pub person_id: String,
    pub username: String,
    pub account_id: String,
}

impl Event for PersonDeletedAfterDeadlineExceeded {
    const TOPIC: &'static str = "xavyo.person.deadline_exceeded";
    const EVENT_TYPE: &'static str = "xavyo.person.deadline_exceeded";
}
