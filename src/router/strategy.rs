// Caching strategies
// Author: kelexine (https://github.com/kelexine)

use super::interceptor::Served;
use crate::cache::{CacheStorage, RequestKey, ResourceResponse};
use crate::error::{Result, RouterError};
use crate::network::{Fetcher, ResourceRequest};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

/// Store a copy when the response is a complete 200. Storage failures are
/// logged and never fail the request.
async fn store_if_cacheable(
    storage: &dyn CacheStorage,
    partition: &str,
    key: RequestKey,
    response: &ResourceResponse,
) {
    if !response.is_cacheable() {
        return;
    }
    match storage.put(partition, key, response.clone()).await {
        Ok(()) => crate::metrics::record_cache_put(partition),
        Err(e) => warn!("Failed to store response in {}: {}", partition, e),
    }
}

/// Serve from the partition when present; otherwise fetch and store.
pub async fn cache_first(
    storage: &dyn CacheStorage,
    fetcher: &dyn Fetcher,
    partition: &str,
    request: &ResourceRequest,
) -> Result<Served> {
    storage.open(partition).await;
    let key = RequestKey::from(request);

    if let Some(cached) = storage.get(partition, &key).await {
        crate::metrics::record_cache_hit(partition);
        return Ok(Served::cache(cached));
    }
    crate::metrics::record_cache_miss(partition);

    let response = fetcher.fetch(request).await?;
    store_if_cacheable(storage, partition, key, &response).await;
    Ok(Served::network(response))
}

/// Fetch first; fall back to the partition only when the network fails.
pub async fn network_first(
    storage: &dyn CacheStorage,
    fetcher: &dyn Fetcher,
    partition: &str,
    request: &ResourceRequest,
) -> Result<Served> {
    storage.open(partition).await;
    let key = RequestKey::from(request);

    match fetcher.fetch(request).await {
        Ok(response) => {
            store_if_cacheable(storage, partition, key, &response).await;
            Ok(Served::network(response))
        }
        Err(e) => {
            debug!("Network failed for {}, trying {}: {}", request.url, partition, e);
            match storage.get(partition, &key).await {
                Some(cached) => {
                    crate::metrics::record_cache_hit(partition);
                    Ok(Served::cache(cached))
                }
                None => {
                    crate::metrics::record_cache_miss(partition);
                    Err(e)
                }
            }
        }
    }
}

/// Answer from the partition immediately and refresh it in the background.
///
/// With no cached copy the caller waits for the background fetch and gets
/// its result, failure included. With a cached copy the background task is
/// detached and its failure only reaches the logs and metrics.
pub async fn stale_while_revalidate(
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    partition: &str,
    request: &ResourceRequest,
) -> Result<Served> {
    storage.open(partition).await;
    let key = RequestKey::from(request);
    let cached = storage.get(partition, &key).await;

    let background = tokio::spawn(revalidate(
        storage,
        fetcher,
        partition.to_string(),
        key,
        request.clone(),
    ));

    match cached {
        Some(cached) => {
            crate::metrics::record_cache_hit(partition);
            Ok(Served::cache(cached))
        }
        None => {
            crate::metrics::record_cache_miss(partition);
            background
                .await
                .map_err(|e| RouterError::Internal(format!("revalidation task failed: {}", e)))?
                .map(Served::network)
        }
    }
}

async fn revalidate(
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    partition: String,
    key: RequestKey,
    request: ResourceRequest,
) -> Result<ResourceResponse> {
    match fetcher.fetch(&request).await {
        Ok(response) => {
            store_if_cacheable(storage.as_ref(), &partition, key, &response).await;
            Ok(response)
        }
        Err(e) => {
            debug!("Background revalidation of {} failed: {}", request.url, e);
            crate::metrics::record_revalidation_failure(&partition);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::network::testing::ScriptedFetcher;
    use crate::router::Source;
    use axum::http::HeaderMap;
    use std::time::Duration;

    const URL: &str = "http://site.test/img/a.png";

    fn request() -> ResourceRequest {
        ResourceRequest::get(URL).unwrap()
    }

    fn key() -> RequestKey {
        RequestKey::from(&request())
    }

    async fn seed(storage: &MemoryStorage, partition: &str, body: &'static str) {
        storage
            .put(partition, key(), ResourceResponse::new(200, HeaderMap::new(), body))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_first_miss_then_hit() {
        let storage = MemoryStorage::new();
        let fetcher = ScriptedFetcher::new();
        fetcher.route(URL, 200, "png");

        let first = cache_first(&storage, &fetcher, "dyn", &request()).await.unwrap();
        assert_eq!(first.source, Source::Network);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(storage.keys("dyn").await.len(), 1);

        let second = cache_first(&storage, &fetcher, "dyn", &request()).await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.response.body, "png");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_errors() {
        let storage = MemoryStorage::new();
        let fetcher = ScriptedFetcher::new();

        let served = cache_first(&storage, &fetcher, "dyn", &request()).await.unwrap();
        assert_eq!(served.response.status, 404);
        assert!(storage.keys("dyn").await.is_empty());
    }

    #[tokio::test]
    async fn test_network_first_prefers_network() {
        let storage = MemoryStorage::new();
        seed(&storage, "dyn", "old").await;
        let fetcher = ScriptedFetcher::new();
        fetcher.route(URL, 200, "new");

        let served = network_first(&storage, &fetcher, "dyn", &request()).await.unwrap();
        assert_eq!(served.response.body, "new");
        assert_eq!(storage.get("dyn", &key()).await.unwrap().body, "new");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache() {
        let storage = MemoryStorage::new();
        seed(&storage, "dyn", "old").await;
        let fetcher = ScriptedFetcher::new();
        fetcher.set_online(false);

        let served = network_first(&storage, &fetcher, "dyn", &request()).await.unwrap();
        assert_eq!(served.source, Source::Cache);
        assert_eq!(served.response.body, "old");
    }

    #[tokio::test]
    async fn test_network_first_fails_without_cache() {
        let storage = MemoryStorage::new();
        let fetcher = ScriptedFetcher::new();
        fetcher.set_online(false);

        let err = network_first(&storage, &fetcher, "dyn", &request()).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_swr_returns_stale_even_when_refresh_fails() {
        let storage = Arc::new(MemoryStorage::new());
        seed(&storage, "static", "stale").await;
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.set_online(false);

        let served = stale_while_revalidate(storage.clone(), fetcher.clone(), "static", &request())
            .await
            .unwrap();
        assert_eq!(served.source, Source::Cache);
        assert_eq!(served.response.body, "stale");
    }

    #[tokio::test]
    async fn test_swr_refreshes_in_background() {
        let storage = Arc::new(MemoryStorage::new());
        seed(&storage, "static", "stale").await;
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.route(URL, 200, "fresh");

        let served = stale_while_revalidate(storage.clone(), fetcher.clone(), "static", &request())
            .await
            .unwrap();
        assert_eq!(served.response.body, "stale");

        let refreshed = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if storage.get("static", &key()).await.unwrap().body == "fresh" {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(refreshed.is_ok(), "background fetch should update the entry");
    }

    #[tokio::test]
    async fn test_swr_waits_for_network_without_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.route(URL, 200, "fresh");

        let served = stale_while_revalidate(storage.clone(), fetcher.clone(), "static", &request())
            .await
            .unwrap();
        assert_eq!(served.source, Source::Network);
        assert_eq!(served.response.body, "fresh");
        assert!(storage.get("static", &key()).await.is_some());

        fetcher.set_online(false);
        let storage = Arc::new(MemoryStorage::new());
        let result = stale_while_revalidate(storage, fetcher, "static", &request()).await;
        assert!(result.is_err());
    }
}
