//! Lifecycle event handler for groupware provisioning.
//!
//! Subscribes to email address and person lifecycle events, drives the
//! matching multi-step workflow against the groupware system and publishes
//! one follow-up event per successful workflow.
//!
//! Every workflow first checks the global enable switch. Failures are logged
//! and end processing of that event; the bus never sees them.

use crate::client::GroupwareClient;
use crate::config::GroupwareConfig;
use crate::error::{GroupwareError, GroupwareResult};
use crate::ids::{AccountId, GroupId, GroupName};
use crate::membership::GroupMembership;
use crate::operation::{
    AccountExists, ChangeAccount, CreateAccount, DeleteAccount, FetchAccountData,
    SetModuleAccess,
};
use crate::ports::{EmailAddressRepository, Person, PersonRepository, PersonenkontextRepository};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use xavyo_events::events::{
    AccountChanged, AccountCreated, AccountDeleted, AliasRemoved, EmailAddressAlreadyExists,
    EmailAddressChanged, EmailAddressDeleted, EmailAddressDisabled, EmailAddressGenerated,
    EmailAddressesPurged, PersonDeleted, PersonDeletedAfterDeadlineExceeded,
    PersonenkontextUpdated,
};
use xavyo_events::{Event, EventBus, EventBusExt, EventHandler, HandlerRegistry};

/// Drives groupware provisioning from lifecycle events.
pub struct GroupwareEventHandler {
    config: Arc<GroupwareConfig>,
    client: Arc<GroupwareClient>,
    membership: GroupMembership,
    persons: Arc<dyn PersonRepository>,
    email_addresses: Arc<dyn EmailAddressRepository>,
    kontexte: Arc<dyn PersonenkontextRepository>,
    bus: Arc<dyn EventBus>,
}

impl GroupwareEventHandler {
    /// Create a new handler.
    pub fn new(
        config: Arc<GroupwareConfig>,
        client: Arc<GroupwareClient>,
        persons: Arc<dyn PersonRepository>,
        email_addresses: Arc<dyn EmailAddressRepository>,
        kontexte: Arc<dyn PersonenkontextRepository>,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            membership: GroupMembership::new(Arc::clone(&client)),
            config,
            client,
            persons,
            email_addresses,
            kontexte,
            bus,
        }
    }

    /// Whether to run the workflow for `E`; logs once when the integration is off.
    fn enabled_for<E: Event>(&self) -> bool {
        if !self.config.enabled {
            info!(
                event_type = E::EVENT_TYPE,
                "Groupware integration not enabled, ignoring event"
            );
        }
        self.config.enabled
    }

    async fn person(&self, person_id: &str) -> GroupwareResult<Person> {
        self.persons
            .find_by_id(person_id)
            .await?
            .ok_or_else(|| GroupwareError::PersonNotFound(person_id.to_string()))
    }

    fn context_id(&self) -> String {
        self.config.context.id.to_string()
    }

    fn context_name(&self) -> String {
        self.config.context.name.clone()
    }

    /// Find or create `lehrer-{org_code}` and add the account to it.
    async fn join_organisation_group(
        &self,
        account_id: &AccountId,
        org_code: &str,
    ) -> GroupwareResult<GroupId> {
        let name = GroupName::for_organisation(org_code);
        let group_id = self
            .membership
            .get_existing_group_by_name_or_create(&name, name.as_str())
            .await?;
        self.membership
            .add_account_to_group(account_id, &group_id)
            .await?;
        Ok(group_id)
    }

    // ── Account creation ──────────────────────────────────────────────

    /// Create the account for a newly generated address and place it in the
    /// organisation's teacher group.
    pub async fn handle_address_generated(
        &self,
        event: &EmailAddressGenerated,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressGenerated>() {
            return Ok(());
        }

        let person = self.person(&event.person_id).await?;
        let username = person
            .username
            .clone()
            .ok_or_else(|| GroupwareError::MissingUsername(person.id.clone()))?;
        let email = self
            .email_addresses
            .find_requested_by_person(&person.id)
            .await?
            .ok_or_else(|| GroupwareError::MissingEmailAddress(person.id.clone()))?;

        let exists = self
            .client
            .send(&AccountExists {
                username: username.clone(),
            })
            .await?;
        if exists {
            return Err(GroupwareError::AccountAlreadyExists(username));
        }

        let created = self
            .client
            .send(&CreateAccount {
                username: username.clone(),
                display_name: username.clone(),
                given_name: person.given_name.clone(),
                surname: person.family_name.clone(),
                email: email.address.clone(),
                password: self.config.default_user_password.clone(),
            })
            .await?;
        info!(
            person_id = %person.id,
            account_id = %created.id,
            username = %username,
            "Created groupware account"
        );

        let group_id = self
            .join_organisation_group(&created.id, &event.org_code)
            .await?;

        if let Err(e) = self
            .client
            .send(&SetModuleAccess {
                account_id: created.id.clone(),
                access: self.config.module_access,
            })
            .await
        {
            warn!(
                account_id = %created.id,
                error = %e,
                "Could not set module access for groupware account"
            );
        }

        if let Err(e) = self.persons.save_account_id(&person.id, &created.id).await {
            error!(
                person_id = %person.id,
                account_id = %created.id,
                error = %e,
                "Could not persist groupware account id on person"
            );
            return Err(e);
        }

        self.bus
            .publish(AccountCreated {
                person_id: person.id,
                username,
                account_id: created.id.to_string(),
                account_name: created.username,
                group_id: group_id.to_string(),
                context_id: self.context_id(),
                context_name: self.context_name(),
                primary_email: created.primary_email.unwrap_or(email.address),
            })
            .await?;
        Ok(())
    }

    /// Add the existing account of a person to the organisation's group.
    pub async fn handle_already_exists(
        &self,
        event: &EmailAddressAlreadyExists,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressAlreadyExists>() {
            return Ok(());
        }

        let person = self.person(&event.person_id).await?;
        let account_id = person
            .account_id
            .clone()
            .ok_or_else(|| GroupwareError::MissingAccountId(person.id.clone()))?;

        let group_id = self
            .join_organisation_group(&account_id, &event.org_code)
            .await?;
        info!(
            person_id = %person.id,
            account_id = %account_id,
            group_id = %group_id,
            "Added existing groupware account to organisation group"
        );

        self.bus
            .publish(AccountChanged {
                person_id: person.id,
                username: person.username,
                account_id: account_id.into_inner(),
                account_name: None,
                context_id: self.context_id(),
                context_name: self.context_name(),
                primary_email: None,
            })
            .await?;
        Ok(())
    }

    // ── Address changes ───────────────────────────────────────────────

    pub async fn handle_address_changed(&self, event: &EmailAddressChanged) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressChanged>() {
            return Ok(());
        }
        self.switch_primary_address(&event.person_id, &event.new_address)
            .await
    }

    /// Promote the person's most recently requested address to primary.
    pub async fn handle_address_disabled(
        &self,
        event: &EmailAddressDisabled,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressDisabled>() {
            return Ok(());
        }

        let requested = self
            .email_addresses
            .find_requested_by_person(&event.person_id)
            .await?
            .ok_or_else(|| GroupwareError::MissingEmailAddress(event.person_id.clone()))?;
        self.switch_primary_address(&event.person_id, &requested.address)
            .await
    }

    /// Make `new_address` the primary address, keeping the superseded
    /// primary as an alias.
    async fn switch_primary_address(
        &self,
        person_id: &str,
        new_address: &str,
    ) -> GroupwareResult<()> {
        let person = self.person(person_id).await?;
        let account_id = person
            .account_id
            .clone()
            .ok_or_else(|| GroupwareError::MissingAccountId(person.id.clone()))?;
        let username = person
            .username
            .clone()
            .ok_or_else(|| GroupwareError::MissingUsername(person.id.clone()))?;

        let data = self
            .client
            .send(&FetchAccountData {
                account_id: account_id.clone(),
            })
            .await?;

        let mut aliases = data.aliases;
        if let Some(superseded) = data.primary_email {
            if !aliases.contains(&superseded) {
                aliases.push(superseded);
            }
        }
        if !aliases.iter().any(|alias| alias == new_address) {
            aliases.push(new_address.to_string());
        }

        self.client
            .send(
                &ChangeAccount::new(account_id.clone())
                    .aliases(aliases)
                    .primary_email(new_address),
            )
            .await?;
        info!(
            person_id = %person.id,
            account_id = %account_id,
            "Changed primary address of groupware account"
        );

        self.bus
            .publish(AccountChanged {
                person_id: person.id,
                username: Some(username),
                account_id: account_id.into_inner(),
                account_name: Some(data.username),
                context_id: self.context_id(),
                context_name: self.context_name(),
                primary_email: Some(new_address.to_string()),
            })
            .await?;
        Ok(())
    }

    /// Detach a deleted address from the account's aliases.
    pub async fn handle_address_deleted(&self, event: &EmailAddressDeleted) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressDeleted>() {
            return Ok(());
        }

        let account_id = AccountId::new(event.account_id.as_str());
        let data = self
            .client
            .send(&FetchAccountData {
                account_id: account_id.clone(),
            })
            .await?;

        let aliases: Vec<String> = data
            .aliases
            .into_iter()
            .filter(|alias| alias != &event.address)
            .collect();

        self.client
            .send(&ChangeAccount::new(account_id.clone()).aliases(aliases))
            .await?;
        info!(
            person_id = %event.person_id,
            account_id = %account_id,
            address = %event.address,
            "Removed alias from groupware account"
        );

        self.bus
            .publish(AliasRemoved {
                person_id: event.person_id.clone(),
                username: event.username.clone(),
                account_id: account_id.into_inner(),
                context_id: self.context_id(),
                context_name: self.context_name(),
                removed_address: event.address.clone(),
                primary_email: data.primary_email,
            })
            .await?;
        Ok(())
    }

    // ── Deletion ──────────────────────────────────────────────────────

    pub async fn handle_person_deleted(&self, event: &PersonDeleted) -> GroupwareResult<()> {
        if !self.enabled_for::<PersonDeleted>() {
            return Ok(());
        }

        let address = event
            .email_address
            .as_deref()
            .ok_or_else(|| GroupwareError::MissingEmailAddress(event.person_id.clone()))?;
        let account_id = self
            .email_addresses
            .find_by_address(address)
            .await?
            .and_then(|email| email.account_id)
            .ok_or_else(|| GroupwareError::MissingAccountId(event.person_id.clone()))?;

        self.delete_account(&event.person_id, event.username.clone(), account_id)
            .await
    }

    pub async fn handle_addresses_purged(
        &self,
        event: &EmailAddressesPurged,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<EmailAddressesPurged>() {
            return Ok(());
        }

        self.delete_account(
            &event.person_id,
            Some(event.username.clone()),
            AccountId::new(event.account_id.as_str()),
        )
        .await
    }

    /// Leave every group, then delete the account.
    async fn delete_account(
        &self,
        person_id: &str,
        username: Option<String>,
        account_id: AccountId,
    ) -> GroupwareResult<()> {
        let left = self
            .membership
            .remove_account_from_all_groups(&account_id)
            .await?;
        self.client
            .send(&DeleteAccount {
                account_id: account_id.clone(),
            })
            .await?;
        info!(
            person_id,
            account_id = %account_id,
            groups_left = left.len(),
            "Deleted groupware account"
        );

        self.bus
            .publish(AccountDeleted {
                person_id: person_id.to_string(),
                username,
                account_id: account_id.into_inner(),
                context_id: self.context_id(),
                context_name: self.context_name(),
            })
            .await?;
        Ok(())
    }

    // ── Kontexte ──────────────────────────────────────────────────────

    /// Align teacher group memberships with the person's current kontexte.
    pub async fn handle_personenkontext_updated(
        &self,
        event: &PersonenkontextUpdated,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<PersonenkontextUpdated>() {
            return Ok(());
        }

        let person = self.person(&event.person.id).await?;
        let Some(account_id) = person.account_id else {
            info!(
                person_id = %person.id,
                "Person has no groupware account, skipping group sync"
            );
            return Ok(());
        };

        let desired: Vec<GroupName> = event
            .current_kontexte
            .iter()
            .filter(|kontext| kontext.role.is_teaching())
            .filter_map(|kontext| kontext.organisation_code.as_deref())
            .map(GroupName::for_organisation)
            .collect();

        let changes = self
            .membership
            .set_account_groups(&account_id, &desired)
            .await?;
        info!(
            person_id = %person.id,
            account_id = %account_id,
            added = changes.added.len(),
            removed = changes.removed.len(),
            "Synchronized groupware group memberships"
        );

        self.bus
            .publish(AccountChanged {
                person_id: person.id,
                username: event.person.username.clone(),
                account_id: account_id.into_inner(),
                account_name: None,
                context_id: self.context_id(),
                context_name: self.context_name(),
                primary_email: None,
            })
            .await?;
        Ok(())
    }

    /// Rename the account to the person id once the person keeps no teaching
    /// kontext, which frees the username.
    pub async fn handle_deadline_exceeded(
        &self,
        event: &PersonDeletedAfterDeadlineExceeded,
    ) -> GroupwareResult<()> {
        if !self.enabled_for::<PersonDeletedAfterDeadlineExceeded>() {
            return Ok(());
        }

        let kontexte = self.kontexte.find_by_person(&event.person_id).await?;
        if kontexte.iter().any(|kontext| kontext.role.is_teaching()) {
            info!(
                person_id = %event.person_id,
                "Person still holds a teaching kontext, keeping groupware account"
            );
            return Ok(());
        }

        let account_id = AccountId::new(event.account_id.as_str());
        self.client
            .send(&ChangeAccount::new(account_id.clone()).username(event.person_id.as_str()))
            .await?;
        info!(
            person_id = %event.person_id,
            account_id = %account_id,
            "Renamed groupware account after deletion deadline"
        );

        self.bus
            .publish(AccountChanged {
                person_id: event.person_id.clone(),
                username: Some(event.username.clone()),
                account_id: account_id.into_inner(),
                account_name: Some(event.person_id.clone()),
                context_id: self.context_id(),
                context_name: self.context_name(),
                primary_email: None,
            })
            .await?;
        Ok(())
    }
}

/// Bus subscriptions: failures are logged here and never reach the bus.
macro_rules! consume {
    ($($event:ty => $method:ident),* $(,)?) => {
        $(
            #[async_trait]
            impl EventHandler<$event> for GroupwareEventHandler {
                async fn handle(
                    &self,
                    event: $event,
                ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                    if let Err(e) = self.$method(&event).await {
                        error!(
                            event_type = <$event as Event>::EVENT_TYPE,
                            error = %e,
                            "Groupware provisioning failed"
                        );
                    }
                    Ok(())
                }
            }
        )*

        impl GroupwareEventHandler {
            /// Subscribe the handler to every event it consumes.
            pub fn register(self: &Arc<Self>, registry: &mut HandlerRegistry) {
                $( registry.register::<$event, _>(Arc::clone(self)); )*
            }
        }
    };
}

consume! {
    EmailAddressGenerated => handle_address_generated,
    EmailAddressChanged => handle_address_changed,
    EmailAddressDisabled => handle_address_disabled,
    EmailAddressAlreadyExists => handle_already_exists,
    EmailAddressDeleted => handle_address_deleted,
    EmailAddressesPurged => handle_addresses_purged,
    PersonDeleted => handle_person_deleted,
    PersonenkontextUpdated => handle_personenkontext_updated,
    PersonDeletedAfterDeadlineExceeded => handle_deadline_exceeded,
}
