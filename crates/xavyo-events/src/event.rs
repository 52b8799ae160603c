//! Event trait definition for type-safe event publishing/consuming.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be published and consumed as bus events.
///
/// Implementors must define the topic and event type name.
/// The event type is automatically serialized/deserialized as JSON.
///
/// # Example
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use xavyo_events::Event;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// pub struct MailboxArchived {
///     pub account_id: String,
/// }
///
/// impl Event for MailboxArchived {
///     const TOPIC: &'static str = "xavyo.groupware.mailbox.archived";
///     const EVENT_TYPE: &'static str = "xavyo.groupware.mailbox.archived";
/// }
/// ```
pub trait Event: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The topic for this event type.
    const TOPIC: &'static str;

    /// The fully qualified event type name.
    ///
    /// This is stored in the event envelope and used as the routing key by
    /// [`crate::HandlerRegistry`].
    /// Convention: `xavyo.<service>.<entity>.<action>`
    const EVENT_TYPE: &'static str;
}
