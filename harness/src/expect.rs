//! Completion-tracked expectations over declared outbound calls
//!
//! An `Expect` is a handle over a shared matcher registry. Interceptors
//! declared through it must each be observed exactly once before the
//! expectation settles; `done` suspends until then. The deadline for giving
//! up is imposed externally by the run's timeout, never here.

use anyhow::Result;
use futures::future::try_join_all;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::intercept::{InterceptScope, Interceptor, MatcherRegistry};
use crate::net::MockNetwork;

/// One declared outbound-call expectation set
#[derive(Clone)]
pub struct Expect {
    network: MockNetwork,
    base: Url,
    matchers: MatcherRegistry,
}

impl Expect {
    pub(crate) fn new(network: MockNetwork, base: Url) -> Self {
        Self {
            network,
            base,
            matchers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Verified interception scope against the default host
    ///
    /// Every interceptor declared on the returned scope counts towards this
    /// expectation's completion.
    pub fn intercept(&self) -> InterceptScope {
        InterceptScope::new(
            self.network.clone(),
            self.base.clone(),
            Some(self.matchers.clone()),
        )
    }

    /// Verified interception scope against a custom host
    pub fn intercept_host(&self, host: &str) -> Result<InterceptScope> {
        let base = Url::parse(host)?;

        Ok(InterceptScope::new(
            self.network.clone(),
            base,
            Some(self.matchers.clone()),
        ))
    }

    pub fn get(&self, uri: &str) -> Interceptor {
        self.intercept().get(uri)
    }

    pub fn post(&self, uri: &str) -> Interceptor {
        self.intercept().post(uri)
    }

    pub fn put(&self, uri: &str) -> Interceptor {
        self.intercept().put(uri)
    }

    pub fn head(&self, uri: &str) -> Interceptor {
        self.intercept().head(uri)
    }

    pub fn patch(&self, uri: &str) -> Interceptor {
        self.intercept().patch(uri)
    }

    pub fn merge(&self, uri: &str) -> Interceptor {
        self.intercept().merge(uri)
    }

    pub fn delete(&self, uri: &str) -> Interceptor {
        self.intercept().delete(uri)
    }

    pub fn options(&self, uri: &str) -> Interceptor {
        self.intercept().options(uri)
    }

    /// Descriptions of the declared calls not yet observed
    pub async fn pending(&self) -> Vec<String> {
        self.matchers
            .lock()
            .await
            .iter()
            .filter(|matcher| !*matcher.state.borrow())
            .map(|matcher| matcher.description.clone())
            .collect()
    }

    /// Suspends until every declared call has been observed
    ///
    /// An expectation with no declared calls is immediately done. Calls
    /// declared while waiting are picked up on the next pass.
    pub async fn done(&self) -> Result<()> {
        loop {
            let unsatisfied: Vec<(String, watch::Receiver<bool>)> = self
                .matchers
                .lock()
                .await
                .iter()
                .filter(|matcher| !*matcher.state.borrow())
                .map(|matcher| (matcher.description.clone(), matcher.state.clone()))
                .collect();

            if unsatisfied.is_empty() {
                return Ok(());
            }

            let waits = unsatisfied.into_iter().map(|(description, mut state)| async move {
                state.wait_for(|matched| *matched).await.map_err(|_| {
                    anyhow::anyhow!("interception endpoint dropped while waiting for {}", description)
                })?;

                Ok::<_, anyhow::Error>(())
            });

            try_join_all(waits).await?;
        }
    }
}
