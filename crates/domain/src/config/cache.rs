use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_TTL_SECS;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of every cache entry, independent of record ttls.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_snapshot_path() -> String {
    "cache.snapshot.json".to_string()
}
