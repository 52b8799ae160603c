//! Captures log events of the current thread for assertions.

#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub message: String,
}

/// Layer recording the level and message of every event.
#[derive(Clone, Default)]
pub struct LogCapture {
    logs: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    /// Install a capturing subscriber as the thread default until the guard
    /// is dropped. Use with a current-thread runtime.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn logs(&self) -> Vec<CapturedLog> {
        self.logs.lock().unwrap().clone()
    }

    /// Number of events whose message contains `fragment`.
    pub fn count_containing(&self, fragment: &str) -> usize {
        self.logs()
            .iter()
            .filter(|log| log.message.contains(fragment))
            .count()
    }

    pub fn errors(&self) -> Vec<CapturedLog> {
        self.logs()
            .into_iter()
            .filter(|log| log.level == Level::ERROR)
            .collect()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logs.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            message: visitor.message,
        });
    }
}
