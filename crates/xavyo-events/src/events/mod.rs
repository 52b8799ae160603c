//! Built-in event types consumed and produced by groupware provisioning.
//!
//! - Email address lifecycle events (generated, changed, disabled, deleted, purged)
//! - Person lifecycle events (deleted, kontexte updated, deletion deadline exceeded)
//! - Groupware account events (created, changed, deleted, alias removed)

pub mod email;
pub mod groupware;
pub mod person;

pub use email::{
    EmailAddressAlreadyExists, EmailAddressChanged, EmailAddressDeleted, EmailAddressDisabled,
    EmailAddressGenerated, EmailAddressStatus, EmailAddressesPurged,
};
pub use groupware::{AccountChanged, AccountCreated, AccountDeleted, AliasRemoved};
pub use person::{
    KontextSnapshot, PersonDeleted, PersonDeletedAfterDeadlineExceeded, PersonSnapshot,
    PersonenkontextUpdated, RoleKind,
};
