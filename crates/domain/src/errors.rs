use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed DNS packet: {0}")]
    MalformedPacket(String),

    #[error("Request cannot be used as a cache key: {0}")]
    InvalidCacheKey(String),

    #[error("Upstream timeout waiting for {server}")]
    UpstreamTimeout { server: String },

    #[error("Upstream {server} unavailable: {reason}")]
    UpstreamUnavailable { server: String, reason: String },

    #[error("Snapshot persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPacket(msg.into())
    }

    /// True for failures of the upstream exchange, which are always recoverable.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamTimeout { .. } | DomainError::UpstreamUnavailable { .. }
        )
    }
}
