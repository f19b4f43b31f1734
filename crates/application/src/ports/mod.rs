mod cache_snapshot_repository;
mod clock;
mod upstream_forwarder;

pub use cache_snapshot_repository::CacheSnapshotRepository;
pub use clock::{Clock, SystemClock};
pub use upstream_forwarder::UpstreamForwarder;
