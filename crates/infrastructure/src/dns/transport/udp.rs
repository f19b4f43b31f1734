//! UDP transport to the upstream resolver (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). Both the send and the receive are
//! bounded by the caller's timeout; no retry is attempted. The socket is
//! connected to the upstream, so datagrams from any other address or port
//! are discarded by the kernel and can never be cached.

use async_trait::async_trait;
use cachedns_application::ports::UpstreamForwarder;
use cachedns_domain::DomainError;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size accepted from upstream
pub const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::UpstreamTimeout {
            server: self.server_addr.to_string(),
        }
    }

    fn io_error(&self, action: &str, e: io::Error) -> DomainError {
        DomainError::UpstreamUnavailable {
            server: self.server_addr.to_string(),
            reason: format!("{}: {}", action, e),
        }
    }
}

#[async_trait]
impl UpstreamForwarder for UdpTransport {
    async fn forward(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError> {
        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.io_error("failed to bind UDP socket", e))?;

        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| self.io_error("failed to connect UDP socket", e))?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send(request))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.io_error("failed to send UDP query", e))?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.io_error("failed to receive UDP response", e))?;

        recv_buf.truncate(bytes_received);

        debug!(
            server = %self.server_addr,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(recv_buf)
    }

    fn server(&self) -> String {
        self.server_addr.to_string()
    }
}
