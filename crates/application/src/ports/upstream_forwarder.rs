use async_trait::async_trait;
use cachedns_domain::DomainError;
use std::time::Duration;

/// Sends a raw request to the upstream resolver and returns its raw reply.
#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    async fn forward(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError>;

    fn server(&self) -> String;
}
