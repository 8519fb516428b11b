//! This module provides reusable test utilities:
//! - Webhook application builders wired to the interception endpoint
//! - Common event payloads and API paths

// Allow unused code in test fixtures - they are utilities shared across test binaries
#![allow(dead_code)]

pub mod test_app;
pub mod test_data;

// Re-export commonly used items
pub use test_app::github_app;
pub use test_data::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs the tracing subscriber once per test binary
///
/// Filtering comes from `RUST_LOG`; output goes through the test writer so it
/// only shows for failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}
