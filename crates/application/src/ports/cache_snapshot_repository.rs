use async_trait::async_trait;
use cachedns_domain::{CacheStore, DomainError};

/// Whole-store persistence of the reply cache.
#[async_trait]
pub trait CacheSnapshotRepository: Send + Sync {
    /// Loads the persisted store; a missing snapshot yields an empty store.
    fn load(&self, ttl_secs: u64) -> Result<CacheStore, DomainError>;

    /// Replaces the persisted snapshot with the full contents of `store`.
    /// Implementations must not block the async runtime.
    async fn save(&self, store: &CacheStore) -> Result<(), DomainError>;
}
