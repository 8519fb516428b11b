//! Test webhook application
//!
//! A tiny GitHub-style app: "push" fetches the repository commits,
//! "issues.opened" simulates a slow handler, and "pull_request.closed"
//! issues a MERGE call. All outbound calls go to the interception endpoint
//! handed to the factory and fail on any non-success status, which is how an
//! unmatched call turns into a handler error.

use anyhow::Result;
use harness::{Application, WebhookRouter};
use reqwest::{Client, Method};
use std::time::Duration;
use tokio::time::sleep;

use super::test_data::paths;

pub struct TestApp {
    webhooks: WebhookRouter,
}

impl Application for TestApp {
    fn webhooks(&self) -> &WebhookRouter {
        &self.webhooks
    }
}

/// Application factory for `Harness::new`
pub async fn github_app(endpoint: String) -> Result<Box<dyn Application>> {
    super::init_tracing();

    let client = Client::new();
    let mut webhooks = WebhookRouter::new();

    {
        let client = client.clone();
        let endpoint = endpoint.clone();
        webhooks.on("push", move |_| {
            let client = client.clone();
            let url = format!("{}{}", endpoint, paths::COMMITS);
            async move {
                client.get(url).send().await?.error_for_status()?;
                Ok(())
            }
        });
    }

    webhooks.on("issues.opened", |_| async {
        sleep(Duration::from_millis(2000)).await;
        Ok(())
    });

    {
        let client = client.clone();
        let endpoint = endpoint.clone();
        webhooks.on("pull_request.closed", move |_| {
            let client = client.clone();
            let url = format!("{}{}", endpoint, paths::MERGES);
            async move {
                let method = Method::from_bytes(b"MERGE")?;
                client.request(method, url).send().await?.error_for_status()?;
                Ok(())
            }
        });
    }

    Ok(Box::new(TestApp { webhooks }))
}
