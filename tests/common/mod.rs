// Shared helpers for integration tests
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderMap;
use fluxcache::cache::{MemoryStorage, ResourceResponse};
use fluxcache::error::{Result, RouterError};
use fluxcache::network::{Fetcher, ResourceRequest};
use fluxcache::router::{CacheRouter, RouterConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const ORIGIN: &str = "http://portfolio.test";

/// Fetcher serving canned bodies, counting calls, switchable offline.
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serve(&self, path_or_url: &str, status: u16, body: &str) {
        let url = if path_or_url.starts_with('/') {
            format!("{}{}", ORIGIN, path_or_url)
        } else {
            path_or_url.to_string()
        };
        self.routes.lock().insert(url, (status, body.to_string()));
    }

    pub fn go_offline(&self) {
        self.online.store(false, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(RouterError::Network("network unreachable".to_string()));
        }
        let (status, body) = self
            .routes
            .lock()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        Ok(ResourceResponse::new(status, HeaderMap::new(), body))
    }
}

/// An activated router over empty in-memory partitions.
pub async fn active_router() -> (CacheRouter, Arc<MemoryStorage>, Arc<FakeNetwork>) {
    let storage = Arc::new(MemoryStorage::new());
    let network = Arc::new(FakeNetwork::new());
    let router = CacheRouter::new(
        RouterConfig::with_origin(ORIGIN.parse().unwrap()),
        storage.clone(),
        network.clone(),
    );
    router.skip_waiting();
    router.activate().await;
    (router, storage, network)
}

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}
