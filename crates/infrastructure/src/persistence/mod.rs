mod snapshot;

pub use snapshot::{JsonSnapshotRepository, SNAPSHOT_VERSION};
