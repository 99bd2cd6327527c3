// Scripted fetcher for unit tests
// Author: kelexine (https://github.com/kelexine)

use super::{Fetcher, ResourceRequest};
use crate::cache::ResourceResponse;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use axum::http::HeaderMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Serves canned bodies by URL, counts calls and can be switched offline.
/// Unknown URLs answer 404.
pub(crate) struct ScriptedFetcher {
    routes: Mutex<HashMap<String, (u16, String)>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn route(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .insert(url.to_string(), (status, body.to_string()));
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(RouterError::Network(format!("offline: {}", request.url)));
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
