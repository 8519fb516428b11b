//! Interception scopes and reply builders
//!
//! An `InterceptScope` stands in for one HTTP host: it matches outbound calls
//! by method and path and answers them with canned responses instead of real
//! network I/O. Each declared call produces an `Interceptor` builder; calling
//! `reply` mounts it on the interception endpoint.
//!
//! A scope created through an Expectation carries a matcher registry, so every
//! interceptor it declares counts towards run completion. Ad-hoc scopes carry
//! no registry and are never waited on.

use anyhow::Result;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::debug;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, Request, ResponseTemplate};

use crate::constants::verbs;
use crate::net::MockNetwork;

/// One declared call pattern with its settlement signal
pub(crate) struct Matcher {
    pub description: String,
    pub state: watch::Receiver<bool>,
}

/// Shared, ordered record of the matchers declared on one Expectation
pub(crate) type MatcherRegistry = Arc<Mutex<Vec<Matcher>>>;

/// A stand-in for one HTTP host
pub struct InterceptScope {
    network: MockNetwork,
    base: Url,
    registry: Option<MatcherRegistry>,
}

impl InterceptScope {
    pub(crate) fn new(network: MockNetwork, base: Url, registry: Option<MatcherRegistry>) -> Self {
        Self {
            network,
            base,
            registry,
        }
    }

    /// Declares one intercepted call with an arbitrary verb
    pub fn request(&self, verb: &str, uri: &str) -> Interceptor {
        Interceptor {
            network: self.network.clone(),
            registry: self.registry.clone(),
            base: self.base.clone(),
            verb: verb.to_string(),
            uri: uri.to_string(),
            headers: Vec::new(),
            delay: None,
        }
    }

    pub fn get(&self, uri: &str) -> Interceptor {
        self.request(verbs::GET, uri)
    }

    pub fn post(&self, uri: &str) -> Interceptor {
        self.request(verbs::POST, uri)
    }

    pub fn put(&self, uri: &str) -> Interceptor {
        self.request(verbs::PUT, uri)
    }

    pub fn head(&self, uri: &str) -> Interceptor {
        self.request(verbs::HEAD, uri)
    }

    pub fn patch(&self, uri: &str) -> Interceptor {
        self.request(verbs::PATCH, uri)
    }

    pub fn merge(&self, uri: &str) -> Interceptor {
        self.request(verbs::MERGE, uri)
    }

    pub fn delete(&self, uri: &str) -> Interceptor {
        self.request(verbs::DELETE, uri)
    }

    pub fn options(&self, uri: &str) -> Interceptor {
        self.request(verbs::OPTIONS, uri)
    }
}

/// Reply builder for one declared call
///
/// Nothing is mounted until `reply` or `reply_empty` runs, so a built but
/// unreplied interceptor matches nothing and blocks nothing.
pub struct Interceptor {
    network: MockNetwork,
    registry: Option<MatcherRegistry>,
    base: Url,
    verb: String,
    uri: String,
    headers: Vec<(String, String)>,
    delay: Option<Duration>,
}

impl Interceptor {
    /// Adds a response header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Delays the canned response
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Mounts the interceptor with a JSON body
    pub async fn reply(self, status: u16, body: Value) -> Result<()> {
        let template = ResponseTemplate::new(status).set_body_json(body);
        self.mount(template).await
    }

    /// Mounts the interceptor with an empty body
    pub async fn reply_empty(self, status: u16) -> Result<()> {
        self.mount(ResponseTemplate::new(status)).await
    }

    async fn mount(self, mut template: ResponseTemplate) -> Result<()> {
        let target = resolve(&self.base, &self.uri)?;
        let description = format!("{} {}", self.verb, target);

        for (name, value) in &self.headers {
            template = template.append_header(name.as_str(), value.as_str());
        }
        if let Some(delay) = self.delay {
            template = template.set_delay(delay);
        }

        let (tx, rx) = watch::channel(false);
        let matched = description.clone();
        let responder = move |_: &Request| {
            // First hit settles the matcher; up_to_n_times stops later hits.
            let _ = tx.send(true);
            debug!(matcher = %matched, "interceptor matched");
            template.clone()
        };

        let mut mock = Mock::given(method(self.verb.as_str())).and(path(target.path()));
        for (name, value) in target.query_pairs() {
            mock = mock.and(query_param(name.as_ref(), value.as_ref()));
        }

        self.network
            .register(mock.respond_with(responder).up_to_n_times(1))
            .await?;

        debug!(matcher = %description, "interceptor declared");

        if let Some(registry) = self.registry {
            registry.lock().await.push(Matcher {
                description,
                state: rx,
            });
        }

        Ok(())
    }
}

/// Resolves a request URI against the scope's host when it is host-relative
fn resolve(base: &Url, uri: &str) -> Result<Url> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        Ok(Url::parse(uri)?)
    } else {
        Ok(base.join(uri)?)
    }
}
