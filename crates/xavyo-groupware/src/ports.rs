//! Local state the provisioning workflows read and write.
//!
//! Persistence lives outside this crate; implementations are injected into
//! [`crate::handler::GroupwareEventHandler`] as trait objects.

use crate::error::GroupwareResult;
use crate::ids::AccountId;
use async_trait::async_trait;
use xavyo_events::events::{EmailAddressStatus, RoleKind};

/// A local person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub username: Option<String>,
    pub given_name: String,
    pub family_name: String,
    /// Groupware account id, cached once the account has been created.
    pub account_id: Option<AccountId>,
}

/// A local email address of a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub id: String,
    pub person_id: String,
    pub address: String,
    pub status: EmailAddressStatus,
    /// Groupware account id the address is attached to.
    pub account_id: Option<AccountId>,
}

/// A role of a person at one organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personenkontext {
    pub id: String,
    pub person_id: String,
    pub organisation_id: String,
    pub organisation_code: Option<String>,
    pub role: RoleKind,
}

/// Person lookups and the account id cache.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn find_by_id(&self, person_id: &str) -> GroupwareResult<Option<Person>>;

    /// Cache the groupware account id on the person.
    async fn save_account_id(&self, person_id: &str, account_id: &AccountId)
        -> GroupwareResult<()>;
}

/// Read-only access to email addresses.
#[async_trait]
pub trait EmailAddressRepository: Send + Sync {
    /// The most recently requested address of a person.
    async fn find_requested_by_person(
        &self,
        person_id: &str,
    ) -> GroupwareResult<Option<EmailAddress>>;

    async fn find_by_address(&self, address: &str) -> GroupwareResult<Option<EmailAddress>>;
}

/// Read-only access to the kontexte of a person.
#[async_trait]
pub trait PersonenkontextRepository: Send + Sync {
    async fn find_by_person(&self, person_id: &str) -> GroupwareResult<Vec<Personenkontext>>;
}
