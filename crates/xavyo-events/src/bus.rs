//! Transport-independent publish/subscribe.
//!
//! Handlers are registered once per event type in a [`HandlerRegistry`].
//! Whatever transport delivers an event hands the [`RawEnvelope`] to
//! [`HandlerRegistry::dispatch`], which routes it by its `event_type` tag.

use crate::envelope::{EventEnvelope, RawEnvelope};
use crate::error::EventError;
use crate::event::Event;

use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Trait for handling events of a specific type.
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync + 'static {
    /// Handle an event.
    ///
    /// Return Ok(()) if processing succeeded, Err if it failed.
    async fn handle(&self, event: E) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<E: Event, H: EventHandler<E>> EventHandler<E> for Arc<H> {
    async fn handle(&self, event: E) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.as_ref().handle(event).await
    }
}

/// Type-erased handler stored in the registry.
#[async_trait]
trait RawHandler: Send + Sync {
    async fn handle_raw(&self, envelope: RawEnvelope) -> Result<(), EventError>;
}

struct TypedHandler<E, H> {
    handler: H,
    _phantom: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E: Event, H: EventHandler<E>> RawHandler for TypedHandler<E, H> {
    async fn handle_raw(&self, envelope: RawEnvelope) -> Result<(), EventError> {
        let event_id = envelope.event_id;
        let typed = envelope.into_typed::<E>()?;
        self.handler
            .handle(typed.payload)
            .await
            .map_err(|e| EventError::HandlerFailed {
                event_id,
                cause: e.to_string(),
            })
    }
}

/// Explicit mapping from event-type tag to the handlers subscribed to it.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Vec<Arc<dyn RawHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of type `E`.
    pub fn register<E, H>(&mut self, handler: H) -> &mut Self
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.handlers
            .entry(E::EVENT_TYPE)
            .or_default()
            .push(Arc::new(TypedHandler {
                handler,
                _phantom: PhantomData,
            }));
        debug!(event_type = %E::EVENT_TYPE, "Registered event handler");
        self
    }

    /// Whether at least one handler is subscribed to `event_type`.
    #[must_use]
    pub fn has_handler(&self, event_type: &str) -> bool {
        self.handlers
            .get(event_type)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// All event types with at least one subscriber, sorted.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.handlers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn RawHandler>> {
        self.handlers.get(event_type).cloned().unwrap_or_default()
    }

    /// Route an envelope to every handler subscribed to its event type.
    ///
    /// Handlers run one after another in registration order. A failing
    /// handler is logged and does not prevent the remaining ones from
    /// running; the first failure is returned. Returns the number of
    /// handlers invoked.
    #[instrument(skip(self, envelope), fields(event_id = %envelope.event_id, event_type = %envelope.event_type))]
    pub async fn dispatch(&self, envelope: RawEnvelope) -> Result<usize, EventError> {
        envelope.validate()?;
        run_handlers(self.handlers_for(&envelope.event_type), envelope).await
    }
}

async fn run_handlers(
    handlers: Vec<Arc<dyn RawHandler>>,
    envelope: RawEnvelope,
) -> Result<usize, EventError> {
    let mut first_error = None;
    for handler in &handlers {
        if let Err(e) = handler.handle_raw(envelope.clone()).await {
            error!(
                event_id = %envelope.event_id,
                event_type = %envelope.event_type,
                error = %e,
                "Event handler failed"
            );
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(handlers.len()),
    }
}

/// Publishing side of the event bus.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a type-erased envelope.
    async fn publish_envelope(&self, envelope: RawEnvelope) -> Result<(), EventError>;
}

/// Typed publishing on top of any [`EventBus`].
#[async_trait]
pub trait EventBusExt: EventBus {
    /// Wrap `event` in a fresh envelope and publish it. Returns the event id.
    async fn publish<E: Event>(&self, event: E) -> Result<Uuid, EventError>;
}

#[async_trait]
impl<B: EventBus + ?Sized> EventBusExt for B {
    async fn publish<E: Event>(&self, event: E) -> Result<Uuid, EventError> {
        let envelope = EventEnvelope::new(event);
        let event_id = envelope.event_id;
        self.publish_envelope(envelope.into_raw()?).await?;
        Ok(event_id)
    }
}

/// In-process bus: records every published envelope and delivers it inline
/// to the handlers registered for its type.
#[derive(Default)]
pub struct InMemoryEventBus {
    registry: RwLock<HandlerRegistry>,
    published: Mutex<Vec<RawEnvelope>>,
}

impl InMemoryEventBus {
    /// Create a bus that delivers to the handlers in `registry`.
    #[must_use]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe `handler` to events of type `E` after construction.
    pub fn subscribe<E, H>(&self, handler: H)
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register::<E, H>(handler);
    }

    /// Every envelope published so far, in publish order.
    #[must_use]
    pub fn published(&self) -> Vec<RawEnvelope> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Published payloads of type `E`, in publish order.
    #[must_use]
    pub fn published_of<E: Event>(&self) -> Vec<E> {
        self.published()
            .into_iter()
            .filter(RawEnvelope::is::<E>)
            .filter_map(|raw| raw.into_typed::<E>().ok())
            .map(|envelope| envelope.payload)
            .collect()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish_envelope(&self, envelope: RawEnvelope) -> Result<(), EventError> {
        envelope.validate()?;
        debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            "Publishing event"
        );

        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(envelope.clone());

        // Clone the subscriber list so no lock is held while handlers run;
        // handlers may publish follow-up events on this same bus.
        let handlers = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers_for(&envelope.event_type);

        let event_id = envelope.event_id;
        if let Err(e) = run_handlers(handlers, envelope).await {
            // Already logged per handler; the publisher is not failed.
            debug!(
                event_id = %event_id,
                error = %e,
                "Subscriber failure not propagated to publisher"
            );
        }
        Ok(())
    }
}
