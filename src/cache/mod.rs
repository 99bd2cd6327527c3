// Cache partitions module
// Author: kelexine (https://github.com/kelexine)

pub mod limiter;
pub mod models;
pub mod storage;

pub use limiter::limit_cache_size;
pub use models::{PartitionStats, RequestKey, ResourceResponse};
pub use storage::{CacheStorage, MemoryStorage};
