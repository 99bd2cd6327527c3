//! Configuration data structures for fluxcache.
//!
//! This module defines the schema for the application settings: the HTTP
//! front, the upstream origin, cache partitions, notifications and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream origin that serves the portfolio.
    #[serde(default)]
    pub origin: OriginConfig,

    /// Cache partition naming, limits and resource lists.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Push notification presentation.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Performance and resource management settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the tokio runtime.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for the upstream origin connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Base URL of the static site origin. Origin-form request paths are
    /// resolved against it.
    /// Default: `http://127.0.0.1:3000`
    #[serde(default = "default_origin_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for the two cache partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Prefix shared by every partition name.
    /// Default: `fluxlove`
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,

    /// Version suffix. Changing it on deploy evicts the old partitions during
    /// activation.
    /// Default: `v2.0.0`
    #[serde(default = "default_cache_version")]
    pub version: String,

    /// Entry cap applied to the static partition on cleanup.
    /// Default: `30`
    #[serde(default = "default_static_max_entries")]
    pub static_max_entries: usize,

    /// Entry cap applied to the dynamic partition on cleanup.
    /// Default: `50`
    #[serde(default = "default_dynamic_max_entries")]
    pub dynamic_max_entries: usize,

    /// Application shell resources, pre-cached on install.
    #[serde(default = "default_critical_resources")]
    pub critical_resources: Vec<String>,

    /// Third-party origins served stale-while-revalidate.
    #[serde(default = "default_cacheable_origins")]
    pub cacheable_origins: Vec<String>,

    /// Path served to navigations when both network and cache miss.
    /// Default: `/index.html`
    #[serde(default = "default_offline_page")]
    pub offline_page: String,
}

/// Settings for notifications raised from push messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Default: `fluxlove Portfolio`
    #[serde(default = "default_notification_title")]
    pub title: String,

    #[serde(default = "default_notification_icon")]
    pub icon: String,

    #[serde(default = "default_notification_badge")]
    pub badge: String,

    /// URL opened when the `explore` action is clicked.
    /// Default: `/`
    #[serde(default = "default_explore_url")]
    pub explore_url: String,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Settings for tuning application performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of idle connections to keep per origin host.
    /// Default: `32`
    #[serde(default = "default_pool_size")]
    pub connection_pool_size: usize,

    /// Whether to gzip responses leaving the front.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

impl CacheSettings {
    /// Name of the long-lived partition, e.g. `fluxlove-static-v2.0.0`.
    pub fn static_cache_name(&self) -> String {
        format!("{}-static-{}", self.prefix, self.version)
    }

    /// Name of the short-lived partition, e.g. `fluxlove-dynamic-v2.0.0`.
    pub fn dynamic_cache_name(&self) -> String {
        format!("{}-dynamic-{}", self.prefix, self.version)
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: default_origin_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            prefix: default_cache_prefix(),
            version: default_cache_version(),
            static_max_entries: default_static_max_entries(),
            dynamic_max_entries: default_dynamic_max_entries(),
            critical_resources: default_critical_resources(),
            cacheable_origins: default_cacheable_origins(),
            offline_page: default_offline_page(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            explore_url: default_explore_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            connection_pool_size: default_pool_size(),
            enable_compression: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_origin_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_cache_prefix() -> String {
    "fluxlove".to_string()
}

fn default_cache_version() -> String {
    "v2.0.0".to_string()
}

fn default_static_max_entries() -> usize {
    30
}

fn default_dynamic_max_entries() -> usize {
    50
}

fn default_critical_resources() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/src/css/performance.css",
        "/src/css/hero.css",
        "/src/css/portfolio.css",
        "/src/css/animations-optimized.css",
        "/src/js/core.js",
        "/manifest.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cacheable_origins() -> Vec<String> {
    vec![
        "https://fonts.googleapis.com".to_string(),
        "https://fonts.gstatic.com".to_string(),
    ]
}

fn default_offline_page() -> String {
    "/index.html".to_string()
}

fn default_notification_title() -> String {
    "fluxlove Portfolio".to_string()
}

fn default_notification_icon() -> String {
    "/src/assets/images/icon-192.png".to_string()
}

fn default_notification_badge() -> String {
    "/src/assets/images/icon-72.png".to_string()
}

fn default_explore_url() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_pool_size() -> usize {
    32
}
