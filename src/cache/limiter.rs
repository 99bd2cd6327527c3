// Cache size limiting
// Author: kelexine (https://github.com/kelexine)

use crate::cache::storage::CacheStorage;
use tracing::debug;

/// Trim `partition` to at most `max_entries`, deleting the oldest entries.
///
/// Returns the number of entries removed.
pub async fn limit_cache_size(
    storage: &dyn CacheStorage,
    partition: &str,
    max_entries: usize,
) -> usize {
    let keys = storage.keys(partition).await;
    if keys.len() <= max_entries {
        return 0;
    }

    let excess = keys.len() - max_entries;
    let mut removed = 0;
    for key in &keys[..excess] {
        if storage.delete(partition, key).await {
            removed += 1;
        }
    }

    debug!(
        "Trimmed {} entries from {} (cap {})",
        removed, partition, max_entries
    );
    crate::metrics::record_cache_eviction(partition, removed);
    removed
}
