//! # xavyo-events
//!
//! Event bus library for xavyo.
//!
//! Provides type-safe publish/subscribe abstractions for event-driven
//! communication between xavyo services.
//!
//! ## Features
//!
//! - **Event Publishing**: Publish domain events through any [`EventBus`]
//! - **Explicit Subscription**: One [`HandlerRegistry`] maps event-type tags
//!   to handlers, independent of the transport that delivered the event
//! - **Type Safety**: Compile-time topic/event type association via [`Event`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xavyo_events::{EventBusExt, HandlerRegistry, InMemoryEventBus};
//! use xavyo_events::events::AccountDeleted;
//!
//! let bus = Arc::new(InMemoryEventBus::new(HandlerRegistry::new()));
//! bus.publish(AccountDeleted { /* ... */ }).await?;
//! ```

pub mod bus;
pub mod envelope;
pub mod error;
pub mod event;
pub mod events;

pub use bus::{EventBus, EventBusExt, EventHandler, HandlerRegistry, InMemoryEventBus};
pub use envelope::{EventEnvelope, RawEnvelope};
pub use error::EventError;
pub use event::Event;
