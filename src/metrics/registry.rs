// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, GaugeVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_gauge_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // FETCH METRICS
    // ============================================================================

    /// Intercepted requests by class, strategy and where the answer came from
    pub static ref FETCH_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("fetch_requests_total", "Total intercepted resource requests"),
        &["class", "strategy", "source"], // source: cache, network, offline
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Partition operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache partition operations"),
        &["partition", "operation"], // operation: hit, miss, put, evict
        REGISTRY
    ).unwrap();

    /// Entries per partition, refreshed on install and cleanup
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("cache_entries_current", "Current number of entries per partition"),
        &["partition"],
        REGISTRY
    ).unwrap();

    /// Failed stale-while-revalidate background fetches
    pub static ref REVALIDATION_FAILURES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("revalidation_failures_total", "Background revalidation fetches that failed"),
        &["partition"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // ORIGIN METRICS
    // ============================================================================

    /// Network fetches by origin and status
    pub static ref ORIGIN_FETCHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("origin_fetches_total", "Total network fetches"),
        &["origin", "status"], // status: HTTP status code or "error"
        REGISTRY
    ).unwrap();

    /// Network fetch duration
    pub static ref ORIGIN_FETCH_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("origin_fetch_duration_seconds", "Network fetch duration")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["origin"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // LIFECYCLE METRICS
    // ============================================================================

    /// Lifecycle and peripheral events handled
    pub static ref LIFECYCLE_EVENTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("lifecycle_events_total", "Total lifecycle events handled"),
        &["event"], // install, activate, message, push, notificationclick, sync
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
