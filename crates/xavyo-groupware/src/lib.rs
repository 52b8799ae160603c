//! # xavyo-groupware
//!
//! Provisions groupware (mail and collaboration) accounts and their teacher
//! group memberships from lifecycle events.
//!
//! ## Layers
//!
//! - [`operation`]: typed SOAP operations that render requests and decode responses
//! - [`client::GroupwareClient`]: posts operations, classifies faults, retries
//!   transient failures
//! - [`membership::GroupMembership`]: idempotent group operations and
//!   membership reconciliation
//! - [`handler::GroupwareEventHandler`]: per-event provisioning workflows
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xavyo_groupware::{GroupwareClient, GroupwareConfig, GroupwareEventHandler};
//!
//! let config = Arc::new(GroupwareConfig::from_env()?);
//! let client = Arc::new(GroupwareClient::new(&config)?);
//! let handler = Arc::new(GroupwareEventHandler::new(
//!     config, client, persons, email_addresses, kontexte, bus,
//! ));
//! handler.register(&mut registry);
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod fault;
pub mod handler;
pub mod ids;
pub mod membership;
pub mod operation;
pub mod ports;
pub mod retry;
pub mod soap;

pub use auth::Credentials;
pub use client::GroupwareClient;
pub use config::{ContextConfig, GroupwareConfig, GroupwareConfigBuilder, ModuleAccess};
pub use error::{GroupwareError, GroupwareResult};
pub use fault::{FaultClassifier, FaultRule};
pub use handler::GroupwareEventHandler;
pub use ids::{AccountId, ContextId, GroupId, GroupName};
pub use membership::{GroupMembership, MembershipChanges, MembershipDiff};
pub use operation::Operation;
pub use ports::{
    EmailAddress, EmailAddressRepository, Person, PersonRepository, Personenkontext,
    PersonenkontextRepository,
};
pub use retry::RetryPolicy;
