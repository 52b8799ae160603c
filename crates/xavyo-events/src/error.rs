//! Error types for the xavyo-events crate.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during event operations.
#[derive(Debug, Error)]
pub enum EventError {
    // Publishing errors
    /// Failed to publish event to topic.
    #[error("Failed to publish to topic {topic}: {cause}")]
    PublishFailed { topic: String, cause: String },

    /// Failed to serialize event.
    #[error("Failed to serialize event type {event_type}: {cause}")]
    SerializationFailed { event_type: String, cause: String },

    // Consuming errors
    /// Failed to deserialize event.
    #[error("Failed to deserialize event type {event_type}: {raw}")]
    DeserializationFailed { event_type: String, raw: String },

    /// Event handler failed.
    #[error("Handler failed for event {event_id}: {cause}")]
    HandlerFailed { event_id: Uuid, cause: String },

    // Envelope errors
    /// Invalid event envelope.
    #[error("Invalid event envelope: {reason}")]
    InvalidEnvelope { reason: String },
}

impl EventError {
    /// Returns true if this error is transient and can be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, EventError::PublishFailed { .. })
    }
}
