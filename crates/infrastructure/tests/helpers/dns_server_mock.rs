#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Loopback UDP upstream that answers every query with a fixed A record,
/// or stays silent when started with `start_silent`.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start() -> Result<Self, std::io::Error> {
        Self::spawn(true).await
    }

    pub async fn start_silent() -> Result<Self, std::io::Error> {
        Self::spawn(false).await
    }

    async fn spawn(respond: bool) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = queries.clone();

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if respond {
                                let response = Self::build_mock_response(&buf[..len]);
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Echoes the query with QR/RA set and one answer pointing at the question.
    /// Queries shorter than a header get a one-byte reply.
    pub fn build_mock_response(query: &[u8]) -> Vec<u8> {
        if query.len() < 12 {
            return vec![0xFF];
        }

        let mut response = Vec::with_capacity(512);

        response.extend_from_slice(&query[0..2]);

        response.push(0x81);
        response.push(0x80);

        response.extend_from_slice(&query[4..6]);

        response.extend_from_slice(&[0x00, 0x01]);

        response.extend_from_slice(&[0x00, 0x00]);

        response.extend_from_slice(&[0x00, 0x00]);

        if query.len() > 12 {
            response.extend_from_slice(&query[12..]);
        }

        response.extend_from_slice(&[
            0xc0, 0x0c,
            0x00, 0x01,
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x3c,
            0x00, 0x04,
            93, 184, 216, 34,
        ]);

        response
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
