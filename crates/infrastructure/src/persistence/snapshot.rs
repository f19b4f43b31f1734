use async_trait::async_trait;
use cachedns_application::ports::CacheSnapshotRepository;
use cachedns_domain::{CacheEntry, CacheKey, CacheStore, DomainError};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    entries: Vec<EntryOut<'a>>,
}

#[derive(Serialize)]
struct EntryOut<'a> {
    key: &'a str,
    payload: &'a [u8],
    inserted_at: u64,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    entries: Vec<EntryIn>,
}

#[derive(Deserialize)]
struct EntryIn {
    key: String,
    payload: Vec<u8>,
    inserted_at: u64,
}

/// Persists the whole cache as one JSON document.
///
/// Saves go to `<path>.tmp` first and are renamed over `path`, so a crash
/// mid-write leaves the previous snapshot intact. File I/O runs on the
/// blocking pool.
pub struct JsonSnapshotRepository {
    path: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn persistence_error(&self, action: &str, e: impl std::fmt::Display) -> DomainError {
        DomainError::Persistence(format!("{} {}: {}", action, self.path.display(), e))
    }

    fn encode(store: &CacheStore) -> serde_json::Result<Vec<u8>> {
        let snapshot = SnapshotOut {
            version: SNAPSHOT_VERSION,
            entries: store
                .iter()
                .map(|(key, entry)| EntryOut {
                    key: key.as_str(),
                    payload: &entry.payload,
                    inserted_at: entry.inserted_at,
                })
                .collect(),
        };
        serde_json::to_vec(&snapshot)
    }
}

fn write_temp(tmp: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Writes `contents` to `tmp`, then renames it over `path`. The temp file
/// is removed on any failure.
fn replace_file(path: &Path, tmp: &Path, contents: &[u8]) -> io::Result<()> {
    let result = write_temp(tmp, contents).and_then(|_| fs::rename(tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}

#[async_trait]
impl CacheSnapshotRepository for JsonSnapshotRepository {
    fn load(&self, ttl_secs: u64) -> Result<CacheStore, DomainError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cache snapshot found");
                return Ok(CacheStore::new(ttl_secs));
            }
            Err(e) => return Err(self.persistence_error("failed to read", e)),
        };

        let snapshot: SnapshotIn = serde_json::from_slice(&contents)
            .map_err(|e| self.persistence_error("failed to parse", e))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(self.persistence_error(
                "unsupported snapshot version in",
                snapshot.version,
            ));
        }

        Ok(CacheStore::from_entries(
            ttl_secs,
            snapshot.entries.into_iter().map(|entry| {
                (
                    CacheKey::from(entry.key),
                    CacheEntry::new(entry.payload, entry.inserted_at),
                )
            }),
        ))
    }

    async fn save(&self, store: &CacheStore) -> Result<(), DomainError> {
        let contents =
            Self::encode(store).map_err(|e| self.persistence_error("failed to encode", e))?;

        let path = self.path.clone();
        let tmp = self.temp_path();
        tokio::task::spawn_blocking(move || replace_file(&path, &tmp, &contents))
            .await
            .map_err(|e| self.persistence_error("snapshot writer failed for", e))?
            .map_err(|e| self.persistence_error("failed to write", e))?;

        debug!(path = %self.path.display(), entries = store.len(), "Cache snapshot saved");
        Ok(())
    }
}
