//! Network control for intercepted outbound calls
//!
//! Owns the process-wide interception state so the rest of the harness stays
//! free of global-state reasoning. Blocking real network access is modeled by
//! construction: the application under test receives the interception
//! endpoint as its API base URL, so every outbound call it makes lands on the
//! mock server. Calls matching no registered interceptor are answered 404 and
//! fail inside the application's HTTP client.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use wiremock::{Mock, MockServer};

use crate::errors::HarnessError;

/// Shared handle to the interception endpoint
///
/// Cheap to clone; all clones observe the same endpoint. `block` and `reset`
/// are the setup/teardown halves: `block` provisions the endpoint (idempotent)
/// and `reset` drops it together with every registered mock, leaving the
/// capability indistinguishable from never having been used.
#[derive(Clone, Default)]
pub struct MockNetwork {
    endpoint: Arc<RwLock<Option<MockServer>>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisions the interception endpoint, blocking real outbound traffic
    pub async fn block(&self) {
        let mut guard = self.endpoint.write().await;

        if guard.is_none() {
            let server = MockServer::start().await;
            info!(endpoint = %server.uri(), "interception endpoint provisioned");
            *guard = Some(server);
        }
    }

    /// Drops the endpoint and every mock registered on it
    pub async fn reset(&self) {
        let mut guard = self.endpoint.write().await;

        if guard.take().is_some() {
            info!("interception endpoint reset");
        }
    }

    /// Whether `block` has run without a matching `reset`
    pub async fn enabled(&self) -> bool {
        self.endpoint.read().await.is_some()
    }

    /// Base URL of the interception endpoint
    pub async fn uri(&self) -> Result<String> {
        let guard = self.endpoint.read().await;
        let server = guard.as_ref().ok_or(HarnessError::NetworkDisabled)?;

        Ok(server.uri())
    }

    /// Mounts one interceptor on the endpoint
    pub async fn register(&self, mock: Mock) -> Result<()> {
        let guard = self.endpoint.read().await;
        let server = guard.as_ref().ok_or(HarnessError::NetworkDisabled)?;

        server.register(mock).await;
        debug!("interceptor mounted");

        Ok(())
    }
}
