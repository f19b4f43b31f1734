//! Exact-datagram reply cache.
//!
//! Entries are keyed by the text of the whole request datagram, so only
//! byte-identical repeats (same transaction id included) share an entry.
//! Every entry lives for the same global TTL regardless of the record ttls
//! inside the cached reply.

use crate::DomainError;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(CompactString);

impl CacheKey {
    /// Derives the key from a raw request: the whole datagram decoded as
    /// UTF-8 text, byte for byte.
    pub fn from_request(request: &[u8]) -> Result<Self, DomainError> {
        let text = std::str::from_utf8(request).map_err(|e| {
            DomainError::InvalidCacheKey(format!(
                "{}-byte request is not valid UTF-8: {}",
                request.len(),
                e
            ))
        })?;
        Ok(Self(CompactString::from(text)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for CacheKey {
    fn from(text: &str) -> Self {
        Self(CompactString::from(text))
    }
}

impl From<String> for CacheKey {
    fn from(text: String) -> Self {
        Self(CompactString::from(text))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // keys are raw datagrams; escape control bytes for log output
        write!(f, "{}", self.0.escape_debug())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub payload: Vec<u8>,
    /// Unix seconds.
    pub inserted_at: u64,
}

impl CacheEntry {
    pub fn new(payload: Vec<u8>, inserted_at: u64) -> Self {
        Self {
            payload,
            inserted_at,
        }
    }

    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.inserted_at)
    }

    /// Expired once strictly older than `ttl_secs`.
    pub fn is_expired_at(&self, now: u64, ttl_secs: u64) -> bool {
        self.age_at(now) > ttl_secs
    }
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    entries: FxHashMap<CacheKey, CacheEntry>,
    ttl_secs: u64,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_SECS)
    }
}

impl CacheStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: FxHashMap::default(),
            ttl_secs,
        }
    }

    pub fn from_entries(
        ttl_secs: u64,
        entries: impl IntoIterator<Item = (CacheKey, CacheEntry)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntry)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Returns the entry only while it is still within the TTL at `now`.
    pub fn lookup_fresh_at(&self, key: &CacheKey, now: u64) -> Option<&CacheEntry> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now, self.ttl_secs))
    }

    pub fn is_expired_at(&self, key: &CacheKey, now: u64) -> Option<bool> {
        self.entries
            .get(key)
            .map(|entry| entry.is_expired_at(now, self.ttl_secs))
    }

    pub fn put_at(&mut self, key: CacheKey, payload: Vec<u8>, inserted_at: u64) {
        self.entries
            .insert(key, CacheEntry::new(payload, inserted_at));
    }

    /// Removes every entry expired at `now` and returns the removed keys.
    pub fn sweep_expired_at(&mut self, now: u64) -> Vec<CacheKey> {
        let ttl = self.ttl_secs;
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        expired
    }
}
