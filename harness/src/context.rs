//! Run context owning one application instance
//!
//! Created fresh for every run. The context is the test callback's window
//! into the harness: it creates expectations, opens ad-hoc interception
//! scopes, and delivers webhook events into the application. Completion is
//! aggregated across every expectation created during the run.

use anyhow::Result;
use futures::future::try_join_all;
use reqwest::Url;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::HarnessError;
use crate::expect::Expect;
use crate::intercept::InterceptScope;
use crate::net::MockNetwork;
use crate::webhook::{Application, Delivery};

pub struct Context {
    app: Box<dyn Application>,
    network: MockNetwork,
    base: Url,
    expects: Mutex<Vec<Expect>>,
}

impl Context {
    pub(crate) fn new(app: Box<dyn Application>, network: MockNetwork, base: Url) -> Self {
        Self {
            app,
            network,
            base,
            expects: Mutex::new(Vec::new()),
        }
    }

    /// Creates a new expectation scoped to this run
    ///
    /// Calls declared on it must all be observed before the run can resolve.
    pub async fn expect(&self) -> Expect {
        let expect = Expect::new(self.network.clone(), self.base.clone());

        self.expects.lock().await.push(expect.clone());

        expect
    }

    /// Ad-hoc interception scope against the default host
    ///
    /// Not tracked for completion: a call stubbed here may happen or not
    /// without affecting the run's outcome.
    pub fn intercept(&self) -> InterceptScope {
        InterceptScope::new(self.network.clone(), self.base.clone(), None)
    }

    /// Ad-hoc interception scope against a custom host
    pub fn intercept_host(&self, host: &str) -> Result<InterceptScope> {
        let base = Url::parse(host)?;

        Ok(InterceptScope::new(self.network.clone(), base, None))
    }

    /// Delivers a webhook event and waits for its handlers to finish
    ///
    /// Rejects with a handler-level error when any handler fails, which is
    /// how an unmatched outbound call inside a handler surfaces.
    pub async fn receive(&self, name: &str, payload: Value) -> Result<()> {
        let delivery = Delivery::new(name, payload);
        debug!(delivery = %delivery.id, event = name, "receiving webhook event");

        self.app
            .webhooks()
            .receive(delivery)
            .await
            .map_err(|source| HarnessError::Handler {
                event: name.to_string(),
                source,
            })?;

        Ok(())
    }

    /// Pending matcher descriptions across all expectations, in creation order
    pub async fn pending(&self) -> Vec<String> {
        let expects: Vec<Expect> = self.expects.lock().await.clone();
        let mut pending = Vec::new();

        for expect in &expects {
            pending.extend(expect.pending().await);
        }

        pending
    }

    /// Suspends until every expectation created on this context is done
    pub async fn done(&self) -> Result<()> {
        loop {
            let expects: Vec<Expect> = self.expects.lock().await.clone();

            try_join_all(expects.iter().map(|expect| expect.done())).await?;

            // Handlers may have created more expectations while waiting
            if self.expects.lock().await.len() == expects.len() {
                return Ok(());
            }
        }
    }
}
