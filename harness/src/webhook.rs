//! Webhook delivery and dispatch
//!
//! The harness does not verify signatures or parse transport-level webhook
//! payloads. It only needs a dispatch seam: applications register async
//! handlers by event key, and the harness pushes one `Delivery` at a time
//! through that seam.
//!
//! Event keys are either a plain event name (`"push"`) or `"name.action"`
//! (`"issues.opened"`). A delivery whose payload carries a string `action`
//! field is routed to both keys.

use anyhow::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// One inbound webhook event, tagged with a unique delivery identifier
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub id: Uuid,
    pub name: String,
    pub payload: Value,
}

impl Delivery {
    pub fn new(name: &str, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            payload,
        }
    }
}

type Handler = Arc<dyn Fn(Delivery) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Dispatches deliveries to handlers registered by event key
#[derive(Default)]
pub struct WebhookRouter {
    handlers: HashMap<String, Vec<Handler>>,
}

impl WebhookRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an async handler under an event key
    pub fn on<F, Fut>(&mut self, event: &str, handler: F)
    where
        F: Fn(Delivery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |delivery| Box::pin(handler(delivery)));
        self.handlers.entry(event.to_string()).or_default().push(handler);
    }

    /// Runs every handler registered for this delivery, in registration order
    ///
    /// A delivery with no matching handlers is not an error. The first handler
    /// failure stops dispatch and is returned to the caller.
    pub async fn receive(&self, delivery: Delivery) -> Result<()> {
        let mut selected: Vec<&Handler> = Vec::new();

        if let Some(handlers) = self.handlers.get(&delivery.name) {
            selected.extend(handlers);
        }

        if let Some(action) = delivery.payload.get("action").and_then(Value::as_str) {
            let key = format!("{}.{}", delivery.name, action);
            if let Some(handlers) = self.handlers.get(&key) {
                selected.extend(handlers);
            }
        }

        debug!(
            delivery = %delivery.id,
            event = %delivery.name,
            handlers = selected.len(),
            "dispatching webhook delivery"
        );

        for handler in selected {
            handler(delivery.clone()).await?;
        }

        Ok(())
    }
}

/// The application under test, capability-typed as "exposes a webhook dispatcher"
pub trait Application: Send + Sync {
    fn webhooks(&self) -> &WebhookRouter;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_dispatch_by_event_name() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut router = WebhookRouter::new();
        router.on("push", move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        router.receive(Delivery::new("push", json!({}))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Unrelated event should not reach the handler
        router.receive(Delivery::new("issues", json!({}))).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_by_event_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut router = WebhookRouter::new();
        router.on("issues.opened", move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        // Matching action routes to the name.action key
        router
            .receive(Delivery::new("issues", json!({ "action": "opened" })))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Different action does not
        router
            .receive(Delivery::new("issues", json!({ "action": "closed" })))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let mut router = WebhookRouter::new();
        router.on("push", |_| async { Err(anyhow::anyhow!("boom")) });

        let result = router.receive(Delivery::new("push", json!({}))).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_no_handlers_is_ok() {
        let router = WebhookRouter::new();
        assert!(router.receive(Delivery::new("push", json!({}))).await.is_ok());
    }

    #[test]
    fn test_deliveries_get_unique_ids() {
        let a = Delivery::new("push", json!({}));
        let b = Delivery::new("push", json!({}));
        assert_ne!(a.id, b.id);
    }
}
