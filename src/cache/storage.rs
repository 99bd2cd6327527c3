// Cache storage - named partitions of stored responses
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{PartitionStats, RequestKey, ResourceResponse};
use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use tracing::debug;

/// Named key-value partitions holding previously fetched responses.
///
/// Entries keep insertion order: `keys` lists them oldest first, and putting
/// an existing key replaces it and makes it the newest. Reads never reorder.
/// Every single-key operation is atomic; `put_all` is atomic across its batch.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the partition if it does not exist yet.
    async fn open(&self, partition: &str);

    async fn get(&self, partition: &str, key: &RequestKey) -> Option<ResourceResponse>;

    async fn put(&self, partition: &str, key: RequestKey, response: ResourceResponse) -> Result<()>;

    /// Write a batch in one step; either every entry lands or none does.
    async fn put_all(
        &self,
        partition: &str,
        entries: Vec<(RequestKey, ResourceResponse)>,
    ) -> Result<()>;

    async fn delete(&self, partition: &str, key: &RequestKey) -> bool;

    /// Keys of a partition, oldest first. Empty for unknown partitions.
    async fn keys(&self, partition: &str) -> Vec<RequestKey>;

    /// Partition names in creation order.
    async fn partitions(&self) -> Vec<String>;

    async fn delete_partition(&self, partition: &str) -> bool;

    /// Look the key up in every partition, in creation order.
    async fn match_any(&self, key: &RequestKey) -> Option<ResourceResponse> {
        for partition in self.partitions().await {
            if let Some(hit) = self.get(&partition, key).await {
                return Some(hit);
            }
        }
        None
    }

    async fn stats(&self) -> Vec<PartitionStats> {
        let mut stats = Vec::new();
        for name in self.partitions().await {
            let entries = self.keys(&name).await.len();
            stats.push(PartitionStats { name, entries });
        }
        stats
    }
}

type Partition = LruCache<RequestKey, ResourceResponse>;

/// Process-local storage. Partitions are unbounded LRU lists used purely for
/// their ordering; the size limiter does the trimming.
#[derive(Default)]
pub struct MemoryStorage {
    partitions: RwLock<Vec<(String, Partition)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_partition_mut<T>(&self, name: &str, f: impl FnOnce(&mut Partition) -> T) -> T {
        let mut partitions = self.partitions.write();
        let idx = match partitions.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                debug!("Creating cache partition {}", name);
                partitions.push((name.to_string(), LruCache::unbounded()));
                partitions.len() - 1
            }
        };
        f(&mut partitions[idx].1)
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, partition: &str) {
        self.with_partition_mut(partition, |_| ());
    }

    async fn get(&self, partition: &str, key: &RequestKey) -> Option<ResourceResponse> {
        let partitions = self.partitions.read();
        partitions
            .iter()
            .find(|(n, _)| n == partition)
            .and_then(|(_, entries)| entries.peek(key).cloned())
    }

    async fn put(&self, partition: &str, key: RequestKey, response: ResourceResponse) -> Result<()> {
        self.with_partition_mut(partition, |entries| {
            entries.put(key, response);
        });
        Ok(())
    }

    async fn put_all(
        &self,
        partition: &str,
        entries: Vec<(RequestKey, ResourceResponse)>,
    ) -> Result<()> {
        self.with_partition_mut(partition, |stored| {
            for (key, response) in entries {
                stored.put(key, response);
            }
        });
        Ok(())
    }

    async fn delete(&self, partition: &str, key: &RequestKey) -> bool {
        let mut partitions = self.partitions.write();
        partitions
            .iter_mut()
            .find(|(n, _)| n == partition)
            .map(|(_, entries)| entries.pop(key).is_some())
            .unwrap_or(false)
    }

    async fn keys(&self, partition: &str) -> Vec<RequestKey> {
        let partitions = self.partitions.read();
        partitions
            .iter()
            .find(|(n, _)| n == partition)
            // lru iterates newest first
            .map(|(_, entries)| entries.iter().rev().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    async fn partitions(&self) -> Vec<String> {
        self.partitions.read().iter().map(|(n, _)| n.clone()).collect()
    }

    async fn delete_partition(&self, partition: &str) -> bool {
        let mut partitions = self.partitions.write();
        let before = partitions.len();
        partitions.retain(|(n, _)| n != partition);
        partitions.len() != before
    }
}
