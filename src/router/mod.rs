//! The cache router: request classification, caching strategies and the
//! cache lifecycle.
//!
//! A [`CacheRouter`] is built from immutable configuration plus two injected
//! seams, a [`CacheStorage`] and a [`Fetcher`]. Every event the router handles
//! (install, activate, fetch, message, push, notification click, sync) is a
//! method taking the event and returning its outcome; the HTTP front in
//! `crate::server` is only an adapter.
//!
//! # Submodules
//!
//! - `classifier`: request → resource class, with fixed precedence.
//! - `strategy`: cache-first, network-first and stale-while-revalidate.
//! - `interceptor`: the fetch event with offline recovery.
//! - `lifecycle`: install / activate and the worker state machine.
//! - `events`: cleanup messages, push notifications and background sync.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod classifier;
pub mod events;
pub mod interceptor;
pub mod lifecycle;
pub mod strategy;

pub use classifier::{classify, should_intercept, Partition, ResourceClass};
pub use events::{ClickOutcome, CleanupReport, ClientMessage, Notification, NotificationAction};
pub use interceptor::{FetchOutcome, Served, Source};
pub use lifecycle::{InstallReport, WorkerState};
pub use strategy::Strategy;

use crate::cache::{CacheStorage, RequestKey};
use crate::config::{AppConfig, CacheSettings, NotificationConfig};
use crate::error::{Result, RouterError};
use crate::network::Fetcher;
use parking_lot::RwLock;
use reqwest::Url;
use std::sync::Arc;

/// Immutable router configuration, resolved against the origin base URL.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub origin: Url,
    pub static_cache: String,
    pub dynamic_cache: String,
    pub static_max_entries: usize,
    pub dynamic_max_entries: usize,
    pub critical_resources: Vec<String>,
    /// Serialized origins, e.g. `https://fonts.gstatic.com`.
    pub cacheable_origins: Vec<String>,
    pub offline_page: String,
    pub notifications: NotificationConfig,
}

impl RouterConfig {
    pub fn new(
        origin: Url,
        cache: &CacheSettings,
        notifications: &NotificationConfig,
    ) -> Result<Self> {
        let cacheable_origins = cache
            .cacheable_origins
            .iter()
            .map(|raw| {
                Url::parse(raw)
                    .map(|u| u.origin().ascii_serialization())
                    .map_err(|e| RouterError::Config(format!("invalid cacheable origin {}: {}", raw, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            origin,
            static_cache: cache.static_cache_name(),
            dynamic_cache: cache.dynamic_cache_name(),
            static_max_entries: cache.static_max_entries,
            dynamic_max_entries: cache.dynamic_max_entries,
            critical_resources: cache.critical_resources.clone(),
            cacheable_origins,
            offline_page: cache.offline_page.clone(),
            notifications: notifications.clone(),
        })
    }

    pub fn from_app(config: &AppConfig) -> Result<Self> {
        let origin = Url::parse(&config.origin.base_url).map_err(|e| {
            RouterError::Config(format!("invalid origin base URL {}: {}", config.origin.base_url, e))
        })?;
        Self::new(origin, &config.cache, &config.notifications)
    }

    /// Defaults for everything but the origin.
    pub fn with_origin(origin: Url) -> Self {
        let cache = CacheSettings::default();
        Self {
            origin,
            static_cache: cache.static_cache_name(),
            dynamic_cache: cache.dynamic_cache_name(),
            static_max_entries: cache.static_max_entries,
            dynamic_max_entries: cache.dynamic_max_entries,
            critical_resources: cache.critical_resources,
            cacheable_origins: cache.cacheable_origins,
            offline_page: cache.offline_page,
            notifications: NotificationConfig::default(),
        }
    }

    pub fn partition_name(&self, partition: Partition) -> &str {
        match partition {
            Partition::Static => &self.static_cache,
            Partition::Dynamic => &self.dynamic_cache,
        }
    }

    /// Absolute URL of a path on the origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.origin
            .join(path)
            .map_err(|e| RouterError::Config(format!("cannot resolve {}: {}", path, e)))
    }

    pub fn critical_urls(&self) -> Result<Vec<Url>> {
        self.critical_resources.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn offline_key(&self) -> Result<RequestKey> {
        self.resolve(&self.offline_page).map(|u| RequestKey::from_url(&u))
    }
}

/// Intercepts resource requests and answers them from the cache partitions
/// or the network.
#[derive(Clone)]
pub struct CacheRouter {
    config: Arc<RouterConfig>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: Arc<RwLock<WorkerState>>,
}

impl CacheRouter {
    pub fn new(
        config: RouterConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            fetcher,
            state: Arc::new(RwLock::new(WorkerState::Installing)),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }
}
