// Fetch interception and offline recovery
// Author: kelexine (https://github.com/kelexine)

use super::classifier::{classify, should_intercept};
use super::strategy::{self, Strategy};
use super::CacheRouter;
use crate::cache::{CacheStorage, RequestKey, ResourceResponse};
use crate::network::ResourceRequest;
use tracing::{debug, error};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
    /// Synthesized offline answer (no cache, no network).
    Offline,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Network => "network",
            Source::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Served {
    pub response: ResourceResponse,
    pub source: Source,
}

impl Served {
    pub fn cache(response: ResourceResponse) -> Self {
        Self {
            response,
            source: Source::Cache,
        }
    }

    pub fn network(response: ResourceResponse) -> Self {
        Self {
            response,
            source: Source::Network,
        }
    }

    pub fn offline(response: ResourceResponse) -> Self {
        Self {
            response,
            source: Source::Offline,
        }
    }
}

/// Result of a fetch event.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted: the caller performs a plain network request.
    Passthrough,
    Respond(Served),
}

impl CacheRouter {
    /// Handle a fetch event. Non-GET and non-http(s) requests, and every
    /// request before activation, pass through.
    pub async fn handle_fetch(&self, request: &ResourceRequest) -> FetchOutcome {
        if !self.state().can_intercept() || !should_intercept(request) {
            return FetchOutcome::Passthrough;
        }
        // the browser's own validators would get a 304 that cannot be stored
        let request = request.without_validators();
        FetchOutcome::Respond(self.handle_request(&request).await)
    }

    /// Route an intercepted request through its strategy. Never fails: every
    /// error ends in a cached copy or an offline response.
    pub async fn handle_request(&self, request: &ResourceRequest) -> Served {
        let class = classify(request, &self.config);
        let strategy = class.strategy();
        let partition = self.config.partition_name(class.partition());

        debug!(
            "{} {} -> {} ({} in {})",
            request.method,
            request.url,
            class.as_str(),
            strategy.as_str(),
            partition
        );

        let result = match strategy {
            Strategy::CacheFirst => {
                strategy::cache_first(
                    self.storage.as_ref(),
                    self.fetcher.as_ref(),
                    partition,
                    request,
                )
                .await
            }
            Strategy::NetworkFirst => {
                strategy::network_first(
                    self.storage.as_ref(),
                    self.fetcher.as_ref(),
                    partition,
                    request,
                )
                .await
            }
            Strategy::StaleWhileRevalidate => {
                strategy::stale_while_revalidate(
                    self.storage.clone(),
                    self.fetcher.clone(),
                    partition,
                    request,
                )
                .await
            }
        };

        let served = match result {
            Ok(served) => served,
            Err(e) => {
                error!("Request failed: {} {}", request.url, e);
                self.recover(request).await
            }
        };

        crate::metrics::record_fetch(class.as_str(), strategy.as_str(), served.source.as_str());
        served
    }

    async fn recover(&self, request: &ResourceRequest) -> Served {
        if request.is_navigation() {
            return self.offline_fallback().await;
        }

        match self.storage.match_any(&RequestKey::from(request)).await {
            Some(cached) => Served::cache(cached),
            None => Served::offline(ResourceResponse::text(503, "Offline")),
        }
    }

    /// The cached offline page from the static partition, or a plain-text 503.
    pub async fn offline_fallback(&self) -> Served {
        if let Ok(key) = self.config.offline_key() {
            if let Some(page) = self.storage.get(&self.config.static_cache, &key).await {
                return Served::cache(page);
            }
        }
        Served::offline(ResourceResponse::text(503, "You are offline"))
    }
}
