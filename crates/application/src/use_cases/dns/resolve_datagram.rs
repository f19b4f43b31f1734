use crate::ports::{CacheSnapshotRepository, Clock, SystemClock, UpstreamForwarder};
use cachedns_domain::dns_message::{build_servfail_response, decode_message};
use cachedns_domain::{CacheKey, CacheStore, DomainError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub upstream_timeout: Duration,
    /// Reply SERVFAIL on upstream failure instead of dropping the query.
    pub servfail_on_error: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(2),
            servfail_on_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    InvalidCacheKey,
    UpstreamFailure,
}

/// Result of one request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    CacheHit(Vec<u8>),
    Forwarded(Vec<u8>),
    ServerFailure(Vec<u8>),
    Dropped(DropReason),
}

impl CycleOutcome {
    /// Bytes to send back to the client, if any.
    pub fn reply(&self) -> Option<&[u8]> {
        match self {
            CycleOutcome::CacheHit(bytes)
            | CycleOutcome::Forwarded(bytes)
            | CycleOutcome::ServerFailure(bytes) => Some(bytes),
            CycleOutcome::Dropped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub hits: u64,
    pub misses: u64,
    pub upstream_failures: u64,
    pub dropped: u64,
    pub persistence_failures: u64,
}

/// Runs the cache/forward cycle for one inbound datagram.
///
/// The use case exclusively owns the [`CacheStore`]; callers drive it one
/// request at a time, so no synchronisation is involved. A cycle is
/// [`execute`](Self::execute), then sending the reply, then
/// [`persist`](Self::persist).
pub struct ResolveDatagramUseCase {
    store: CacheStore,
    forwarder: Arc<dyn UpstreamForwarder>,
    snapshots: Arc<dyn CacheSnapshotRepository>,
    clock: Arc<dyn Clock>,
    settings: ResolverSettings,
    stats: CycleStats,
    persist_pending: bool,
}

impl ResolveDatagramUseCase {
    pub fn new(
        store: CacheStore,
        forwarder: Arc<dyn UpstreamForwarder>,
        snapshots: Arc<dyn CacheSnapshotRepository>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            store,
            forwarder,
            snapshots,
            clock: Arc::new(SystemClock),
            settings,
            stats: CycleStats::default(),
            persist_pending: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Loads the persisted store at startup. A missing snapshot is an empty
    /// store; an unreadable one is logged and replaced by an empty store.
    pub fn load_store(snapshots: &dyn CacheSnapshotRepository, ttl_secs: u64) -> CacheStore {
        match snapshots.load(ttl_secs) {
            Ok(store) => {
                info!(entries = store.len(), ttl_secs, "Cache snapshot loaded");
                store
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cache snapshot, starting empty");
                CacheStore::new(ttl_secs)
            }
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub async fn execute(&mut self, request: &[u8]) -> CycleOutcome {
        let start = Instant::now();

        let key = match CacheKey::from_request(request) {
            Ok(key) => key,
            Err(e) => {
                self.stats.dropped += 1;
                warn!(error = %e, bytes = request.len(), "Dropping request");
                return CycleOutcome::Dropped(DropReason::InvalidCacheKey);
            }
        };

        let now = self.clock.now_secs();
        let cached = self
            .store
            .lookup_fresh_at(&key, now)
            .map(|entry| entry.payload.clone());

        let outcome = match cached {
            Some(payload) => {
                self.stats.hits += 1;
                debug!(key = %key, bytes = payload.len(), "Cache hit");
                CycleOutcome::CacheHit(payload)
            }
            None => {
                self.stats.misses += 1;
                self.forward_and_store(key, request).await
            }
        };

        self.sweep_expired();
        log_request_structure(request);
        self.persist_pending = true;

        debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            cache_entries = self.store.len(),
            "Request cycle complete"
        );

        outcome
    }

    async fn forward_and_store(&mut self, key: CacheKey, request: &[u8]) -> CycleOutcome {
        match self
            .forwarder
            .forward(request, self.settings.upstream_timeout)
            .await
        {
            Ok(response) => {
                debug!(
                    key = %key,
                    upstream = %self.forwarder.server(),
                    bytes = response.len(),
                    "Cache miss, stored upstream reply"
                );
                self.store
                    .put_at(key, response.clone(), self.clock.now_secs());
                CycleOutcome::Forwarded(response)
            }
            Err(e) => {
                self.stats.upstream_failures += 1;
                self.upstream_failure_reply(&e, request)
            }
        }
    }

    fn upstream_failure_reply(&mut self, error: &DomainError, request: &[u8]) -> CycleOutcome {
        warn!(error = %error, "Upstream exchange failed");

        if self.settings.servfail_on_error {
            if let Some(response) = build_servfail_response(request) {
                return CycleOutcome::ServerFailure(response);
            }
        }

        self.stats.dropped += 1;
        CycleOutcome::Dropped(DropReason::UpstreamFailure)
    }

    fn sweep_expired(&mut self) {
        let removed = self.store.sweep_expired_at(self.clock.now_secs());
        for key in &removed {
            debug!(key = %key, "Expired cache entry removed");
        }
    }

    /// Saves the store if the last executed cycle accepted its request.
    /// Dropped non-text requests leave nothing to persist.
    pub async fn persist(&mut self) {
        if !std::mem::take(&mut self.persist_pending) {
            return;
        }

        if let Err(e) = self.snapshots.save(&self.store).await {
            self.stats.persistence_failures += 1;
            warn!(error = %e, "Failed to persist cache snapshot");
        }
    }
}

fn log_request_structure(request: &[u8]) {
    match decode_message(request) {
        Ok(message) => {
            debug!(
                header = %message.header,
                records = message.record_count(),
                "Decoded request"
            );
            for q in &message.questions {
                debug!(qname = %q.qname, qtype = q.qtype, qclass = q.qclass, "Question");
            }
            let sections = [
                ("answer", &message.answers),
                ("authority", &message.authorities),
                ("additional", &message.additionals),
            ];
            for (section, records) in sections {
                for rr in records {
                    debug!(
                        section,
                        name = %rr.name,
                        rtype = rr.rtype,
                        rclass = rr.rclass,
                        ttl = rr.ttl,
                        rdlength = rr.rdlength,
                        "Record"
                    );
                }
            }
        }
        Err(e) => {
            warn!(error = %e, bytes = request.len(), "Request could not be decoded");
        }
    }
}
