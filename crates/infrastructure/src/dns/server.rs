use cachedns_application::use_cases::{CycleOutcome, ResolveDatagramUseCase};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

const RECV_BUFFER_SIZE: usize = 4096;

/// How the loop reacts to a failed receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvErrorKind {
    /// Abort the current cycle and wait for the next datagram.
    Transient,
    /// Stop the loop.
    Fatal,
}

/// ICMP port-unreachable surfaces as a connection reset/refused on a
/// connectionless socket; those and interrupted calls are retryable.
pub fn classify_recv_error(e: &io::Error) -> RecvErrorKind {
    match e.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::TimedOut => RecvErrorKind::Transient,
        _ => RecvErrorKind::Fatal,
    }
}

/// Owns the listening socket and drives one request cycle at a time.
pub struct ResolverLoop {
    socket: UdpSocket,
    use_case: ResolveDatagramUseCase,
}

impl ResolverLoop {
    pub fn new(socket: UdpSocket, use_case: ResolveDatagramUseCase) -> Self {
        Self { socket, use_case }
    }

    pub async fn bind(addr: SocketAddr, use_case: ResolveDatagramUseCase) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::new(socket, use_case))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn use_case(&self) -> &ResolveDatagramUseCase {
        &self.use_case
    }

    /// Serves until a fatal socket error.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves or a fatal socket error occurs.
    /// Shutdown is only observed while waiting for a request, never mid-cycle.
    pub async fn run_until<F>(&mut self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        info!(
            listen = %self.local_addr()?,
            "Resolver loop waiting for requests"
        );

        loop {
            let received = tokio::select! {
                _ = &mut shutdown => {
                    info!("Resolver loop stopping");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => received,
            };

            match received {
                Ok((len, peer)) => self.handle_datagram(&buf[..len], peer).await,
                Err(e) => match classify_recv_error(&e) {
                    RecvErrorKind::Transient => {
                        warn!(error = %e, "Transient receive error, waiting for next request");
                    }
                    RecvErrorKind::Fatal => {
                        error!(error = %e, "Fatal receive error");
                        return Err(e);
                    }
                },
            }
        }
    }

    /// The reply is sent before the snapshot is saved.
    async fn handle_datagram(&mut self, request: &[u8], peer: SocketAddr) {
        debug!(client = %peer, bytes = request.len(), "Request received");

        let outcome = self.use_case.execute(request).await;

        match outcome.reply() {
            Some(reply) => match self.socket.send_to(reply, peer).await {
                Ok(_) => debug!(
                    client = %peer,
                    bytes = reply.len(),
                    source = outcome_label(&outcome),
                    "Reply sent"
                ),
                Err(e) => warn!(client = %peer, error = %e, "Failed to send reply"),
            },
            None => debug!(client = %peer, ?outcome, "No reply sent"),
        }

        self.use_case.persist().await;
    }
}

fn outcome_label(outcome: &CycleOutcome) -> &'static str {
    match outcome {
        CycleOutcome::CacheHit(_) => "cache",
        CycleOutcome::Forwarded(_) => "upstream",
        CycleOutcome::ServerFailure(_) => "servfail",
        CycleOutcome::Dropped(_) => "dropped",
    }
}
