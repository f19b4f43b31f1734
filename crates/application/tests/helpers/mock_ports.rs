#![allow(dead_code)]

use async_trait::async_trait;
use cachedns_application::ports::{CacheSnapshotRepository, Clock, UpstreamForwarder};
use cachedns_domain::{CacheStore, DomainError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

pub const UPSTREAM: &str = "192.0.2.53:53";

#[derive(Clone)]
pub struct MockUpstreamForwarder {
    responses: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
    default_response: Arc<RwLock<Option<Vec<u8>>>>,
    error: Arc<RwLock<Option<DomainError>>>,
    calls: Arc<AtomicUsize>,
    last_timeout: Arc<RwLock<Option<Duration>>>,
}

impl MockUpstreamForwarder {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            default_response: Arc::new(RwLock::new(None)),
            error: Arc::new(RwLock::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            last_timeout: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_response(&self, request: &[u8], response: &[u8]) {
        self.responses
            .write()
            .unwrap()
            .insert(request.to_vec(), response.to_vec());
    }

    pub fn set_default_response(&self, response: &[u8]) {
        *self.default_response.write().unwrap() = Some(response.to_vec());
    }

    pub fn set_error(&self, error: Option<DomainError>) {
        *self.error.write().unwrap() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.read().unwrap()
    }
}

impl Default for MockUpstreamForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamForwarder for MockUpstreamForwarder {
    async fn forward(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_timeout.write().unwrap() = Some(timeout);

        if let Some(err) = self.error.read().unwrap().clone() {
            return Err(err);
        }

        if let Some(response) = self.responses.read().unwrap().get(request).cloned() {
            return Ok(response);
        }

        self.default_response
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::UpstreamUnavailable {
                server: UPSTREAM.to_string(),
                reason: "no mock response".to_string(),
            })
    }

    fn server(&self) -> String {
        UPSTREAM.to_string()
    }
}

#[derive(Clone)]
pub struct MockSnapshotRepository {
    saved: Arc<RwLock<Option<CacheStore>>>,
    initial: Arc<RwLock<Option<CacheStore>>>,
    saves: Arc<AtomicUsize>,
    fail_save: Arc<AtomicBool>,
    fail_load: Arc<AtomicBool>,
}

impl MockSnapshotRepository {
    pub fn new() -> Self {
        Self {
            saved: Arc::new(RwLock::new(None)),
            initial: Arc::new(RwLock::new(None)),
            saves: Arc::new(AtomicUsize::new(0)),
            fail_save: Arc::new(AtomicBool::new(false)),
            fail_load: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_initial(store: CacheStore) -> Self {
        let repo = Self::new();
        *repo.initial.write().unwrap() = Some(store);
        repo
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn last_saved(&self) -> Option<CacheStore> {
        self.saved.read().unwrap().clone()
    }
}

impl Default for MockSnapshotRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheSnapshotRepository for MockSnapshotRepository {
    fn load(&self, ttl_secs: u64) -> Result<CacheStore, DomainError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("mock load failure".to_string()));
        }
        Ok(self
            .initial
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| CacheStore::new(ttl_secs)))
    }

    async fn save(&self, store: &CacheStore) -> Result<(), DomainError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("mock save failure".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.saved.write().unwrap() = Some(store.clone());
        Ok(())
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Standard A query for `domain`, ASCII-only so it is a valid cache key.
pub fn query_bytes(id: u16, domain: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in domain.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01]);
    buf
}

pub fn response_bytes(id: u16, domain: &str, ip: [u8; 4]) -> Vec<u8> {
    let mut buf = query_bytes(id, domain);
    buf[2] = 0x81;
    buf[3] = 0x80;
    buf[7] = 0x01;
    buf.extend_from_slice(&[0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x04]);
    buf.extend_from_slice(&ip);
    buf
}
