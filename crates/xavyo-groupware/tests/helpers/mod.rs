//! Shared helpers for the groupware integration tests.

use std::sync::Once;

pub mod fakes;
pub mod log_capture;
pub mod mock_groupware_server;

static INIT: Once = Once::new();

/// Print logs through the test writer when `RUST_LOG` is set (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}
