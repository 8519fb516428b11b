//! Top-level test harness
//!
//! Owns the application factory and the network-control capability, and
//! orchestrates one run end to end: fresh application, fresh context,
//! combined workload (test callback, then expectation completion), raced
//! against the deadline.
//!
//! One harness assumes at most one active run at a time. Tests sharing a
//! harness within a process must serialize their runs.

use anyhow::Result;
use futures::future::BoxFuture;
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::constants::{deadline, net};
use crate::context::Context;
use crate::net::MockNetwork;
use crate::timeout;
use crate::webhook::Application;

type AppFactory =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Box<dyn Application>>> + Send + Sync>;

pub struct Harness {
    factory: AppFactory,
    network: MockNetwork,
    base: Url,
    timeout: Duration,
}

impl Harness {
    /// Creates the harness around an application factory
    ///
    /// The factory is invoked once per run and receives the interception
    /// endpoint's base URL, which the application must use for its outbound
    /// API calls.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Box<dyn Application>>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move |endpoint| Box::pin(factory(endpoint))),
            network: MockNetwork::new(),
            base: Url::parse(net::DEFAULT_API_HOST).expect("default API host must parse"),
            timeout: deadline::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the default host that relative request paths resolve against
    pub fn with_host(mut self, host: &str) -> Result<Self> {
        self.base = Url::parse(host)?;

        Ok(self)
    }

    /// Overrides the default run deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Blocks real outbound network activity for the process
    ///
    /// Intended as a before-each hook. Idempotent.
    pub async fn setup(&self) {
        self.network.block().await;
    }

    /// Clears all interception state and re-enables real network activity
    ///
    /// Intended as an after-each hook; always safe to call regardless of how
    /// the prior run ended.
    pub async fn teardown(&self) {
        self.network.reset().await;
    }

    /// Runs one test against a fresh application with the default deadline
    pub async fn run<F, Fut>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Arc<Context>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.run_timeout(f, self.timeout).await
    }

    /// Runs one test against a fresh application with an explicit deadline
    ///
    /// The callback and every expectation it declares must settle before the
    /// deadline; otherwise the run rejects with a timeout diagnostic listing
    /// the pending matchers.
    pub async fn run_timeout<F, Fut>(&self, f: F, deadline: Duration) -> Result<()>
    where
        F: FnOnce(Arc<Context>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let endpoint = self.network.uri().await?;
        let app = (self.factory)(endpoint).await?;

        let cx = Arc::new(Context::new(app, self.network.clone(), self.base.clone()));
        debug!(deadline_ms = deadline.as_millis() as u64, "starting run");

        let workload_cx = cx.clone();
        let workload = tokio::spawn(async move {
            f(workload_cx.clone()).await?;
            workload_cx.done().await
        });

        timeout::race(&cx, workload, deadline).await
    }
}
