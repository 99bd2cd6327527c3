// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    CACHE_ENTRIES,
    CACHE_OPERATIONS,
    FETCH_REQUESTS,
    LIFECYCLE_EVENTS,
    ORIGIN_FETCHES,
    ORIGIN_FETCH_DURATION,
    REVALIDATION_FAILURES,
};

/// Helper to record an intercepted request
pub fn record_fetch(class: &str, strategy: &str, source: &str) {
    FETCH_REQUESTS.with_label_values(&[class, strategy, source]).inc();
}

/// Helpers to record partition operations
pub fn record_cache_hit(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "hit"]).inc();
}

pub fn record_cache_miss(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "miss"]).inc();
}

pub fn record_cache_put(partition: &str) {
    CACHE_OPERATIONS.with_label_values(&[partition, "put"]).inc();
}

pub fn record_cache_eviction(partition: &str, count: usize) {
    if count > 0 {
        CACHE_OPERATIONS
            .with_label_values(&[partition, "evict"])
            .inc_by(count as f64);
    }
}

pub fn update_cache_entries(partition: &str, count: usize) {
    CACHE_ENTRIES.with_label_values(&[partition]).set(count as f64);
}

pub fn record_revalidation_failure(partition: &str) {
    REVALIDATION_FAILURES.with_label_values(&[partition]).inc();
}

/// Helper to record a network fetch
pub fn record_origin_fetch(origin: &str, status: &str, duration_secs: f64) {
    ORIGIN_FETCHES.with_label_values(&[origin, status]).inc();
    ORIGIN_FETCH_DURATION
        .with_label_values(&[origin])
        .observe(duration_secs);
}

pub fn record_event(event: &str) {
    LIFECYCLE_EVENTS.with_label_values(&[event]).inc();
}
