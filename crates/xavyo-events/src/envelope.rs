//! Event envelope for wrapping all events with metadata.

use crate::error::EventError;
use crate::event::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard envelope wrapping all Xavyo events.
///
/// Contains the metadata required for routing and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Unique identifier for this event instance.
    pub event_id: Uuid,

    /// Fully qualified event type name.
    /// E.g., "xavyo.groupware.account.created"
    pub event_type: String,

    /// Timestamp when the event was created.
    pub timestamp: DateTime<Utc>,

    /// The actual event payload.
    pub payload: T,
}

impl<T: Event> EventEnvelope<T> {
    /// Create a new event envelope.
    pub fn new(payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: T::EVENT_TYPE.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Get the topic for this event.
    pub fn topic(&self) -> &'static str {
        T::TOPIC
    }

    /// Erase the payload type so the envelope can travel through a bus.
    pub fn into_raw(self) -> Result<RawEnvelope, EventError> {
        let payload =
            serde_json::to_value(&self.payload).map_err(|e| EventError::SerializationFailed {
                event_type: T::EVENT_TYPE.to_string(),
                cause: e.to_string(),
            })?;

        Ok(RawEnvelope {
            event_id: self.event_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            payload,
        })
    }
}

/// Raw envelope for routing when the event type is unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl RawEnvelope {
    /// Validate that required fields are present and valid.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.event_type.is_empty() {
            return Err(EventError::InvalidEnvelope {
                reason: "event_type is empty".to_string(),
            });
        }

        if !self.event_type.starts_with("xavyo.") {
            return Err(EventError::InvalidEnvelope {
                reason: format!(
                    "event_type '{}' does not follow naming convention",
                    self.event_type
                ),
            });
        }

        Ok(())
    }

    /// Check whether this envelope carries an event of type `T`.
    #[must_use]
    pub fn is<T: Event>(&self) -> bool {
        self.event_type == T::EVENT_TYPE
    }

    /// Try to deserialize the payload into a specific event type.
    pub fn into_typed<T: Event>(self) -> Result<EventEnvelope<T>, EventError> {
        let payload: T = serde_json::from_value(self.payload).map_err(|e| {
            EventError::DeserializationFailed {
                event_type: self.event_type.clone(),
                raw: e.to_string(),
            }
        })?;

        Ok(EventEnvelope {
            event_id: self.event_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct AliasAdded {
        account_id: String,
        alias: String,
    }

    impl Event for AliasAdded {
        const TOPIC: &'static str = "xavyo.test.alias.added";
        const EVENT_TYPE: &'static str = "xavyo.test.alias.added";
    }

    #[test]
    fn test_envelope_new_sets_event_type() {
        let envelope = EventEnvelope::new(AliasAdded {
            account_id: "42".to_string(),
            alias: "a@b.de".to_string(),
        });

        assert_eq!(envelope.event_type, "xavyo.test.alias.added");
        assert_eq!(envelope.topic(), "xavyo.test.alias.added");
        assert!(envelope.timestamp <= Utc::now());
    }

    #[test]
    fn test_raw_envelope_type_check() {
        let raw = EventEnvelope::new(AliasAdded {
            account_id: "42".to_string(),
            alias: "a@b.de".to_string(),
        })
        .into_raw()
        .unwrap();

        assert!(raw.is::<AliasAdded>());
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn test_into_typed_keeps_envelope_identity() {
        let envelope = EventEnvelope::new(AliasAdded {
            account_id: "42".to_string(),
            alias: "a@b.de".to_string(),
        });
        let event_id = envelope.event_id;
        let timestamp = envelope.timestamp;

        let typed = envelope
            .into_raw()
            .unwrap()
            .into_typed::<AliasAdded>()
            .unwrap();

        assert_eq!(typed.event_id, event_id);
        assert_eq!(typed.timestamp, timestamp);
        assert_eq!(typed.payload.alias, "a@b.de");
    }

    #[test]
    fn test_raw_envelope_rejects_foreign_event_type() {
        let mut raw = EventEnvelope::new(AliasAdded {
            account_id: "42".to_string(),
            alias: "a@b.de".to_string(),
        })
        .into_raw()
        .unwrap();
        raw.event_type = "legacy.alias.added".to_string();

        assert!(matches!(
            raw.validate(),
            Err(EventError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn test_into_typed_reports_payload_mismatch() {
        let mut raw = EventEnvelope::new(AliasAdded {
            account_id: "42".to_string(),
            alias: "a@b.de".to_string(),
        })
        .into_raw()
        .unwrap();
        raw.payload = serde_json::json!({ "unexpected": true });

        let result = raw.into_typed::<AliasAdded>();
        assert!(matches!(
            result,
            Err(EventError::DeserializationFailed { .. })
        ));
    }
}
