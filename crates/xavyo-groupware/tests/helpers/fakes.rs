//! In-memory implementations of the collaborator ports.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use xavyo_events::events::{EmailAddressStatus, RoleKind};
use xavyo_groupware::{
    AccountId, EmailAddress, EmailAddressRepository, GroupwareError, GroupwareResult, Person,
    PersonRepository, Personenkontext, PersonenkontextRepository,
};

pub fn person(id: &str, username: &str) -> Person {
    Person {
        id: id.to_string(),
        username: Some(username.to_string()),
        given_name: "Jane".to_string(),
        family_name: "Doe".to_string(),
        account_id: None,
    }
}

pub fn requested_address(person_id: &str, address: &str) -> EmailAddress {
    EmailAddress {
        id: format!("addr-{address}"),
        person_id: person_id.to_string(),
        address: address.to_string(),
        status: EmailAddressStatus::Requested,
        account_id: None,
    }
}

pub fn kontext(person_id: &str, org_code: &str, role: RoleKind) -> Personenkontext {
    Personenkontext {
        id: format!("k-{person_id}-{org_code}"),
        person_id: person_id.to_string(),
        organisation_id: format!("org-{org_code}"),
        organisation_code: Some(org_code.to_string()),
        role,
    }
}

#[derive(Default)]
pub struct InMemoryPersons {
    persons: Mutex<HashMap<String, Person>>,
    fail_save: AtomicBool,
    save_calls: AtomicUsize,
}

impl InMemoryPersons {
    pub fn with(persons: Vec<Person>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.persons.lock().unwrap();
            for person in persons {
                map.insert(person.id.clone(), person);
            }
        }
        repo
    }

    /// Make `save_account_id` fail.
    pub fn failing_save(self) -> Self {
        self.fail_save.store(true, Ordering::SeqCst);
        self
    }

    pub fn get(&self, person_id: &str) -> Option<Person> {
        self.persons.lock().unwrap().get(person_id).cloned()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersons {
    async fn find_by_id(&self, person_id: &str) -> GroupwareResult<Option<Person>> {
        Ok(self.get(person_id))
    }

    async fn save_account_id(
        &self,
        person_id: &str,
        account_id: &AccountId,
    ) -> GroupwareResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(GroupwareError::Persistence("database unavailable".to_string()));
        }

        let mut persons = self.persons.lock().unwrap();
        let person = persons
            .get_mut(person_id)
            .ok_or_else(|| GroupwareError::PersonNotFound(person_id.to_string()))?;
        person.account_id = Some(account_id.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEmailAddresses {
    addresses: Mutex<Vec<EmailAddress>>,
}

impl InMemoryEmailAddresses {
    pub fn with(addresses: Vec<EmailAddress>) -> Self {
        Self {
            addresses: Mutex::new(addresses),
        }
    }
}

#[async_trait]
impl EmailAddressRepository for InMemoryEmailAddresses {
    async fn find_requested_by_person(
        &self,
        person_id: &str,
    ) -> GroupwareResult<Option<EmailAddress>> {
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|a| a.person_id == person_id && a.status == EmailAddressStatus::Requested)
            .cloned())
    }

    async fn find_by_address(&self, address: &str) -> GroupwareResult<Option<EmailAddress>> {
        Ok(self
            .addresses
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.address == address)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryKontexte {
    kontexte: Mutex<Vec<Personenkontext>>,
}

impl InMemoryKontexte {
    pub fn with(kontexte: Vec<Personenkontext>) -> Self {
        Self {
            kontexte: Mutex::new(kontexte),
        }
    }
}

#[async_trait]
impl PersonenkontextRepository for InMemoryKontexte {
    async fn find_by_person(&self, person_id: &str) -> GroupwareResult<Vec<Personenkontext>> {
        Ok(self
            .kontexte
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.person_id == person_id)
            .cloned()
            .collect())
    }
}
