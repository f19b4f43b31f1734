use cachedns_application::use_cases::ResolveDatagramUseCase;
use cachedns_infrastructure::dns::ResolverLoop;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{info, warn};

/// Binds the listening socket and serves until Ctrl-C or a fatal socket error.
pub async fn start_dns_server(
    bind_addr: SocketAddr,
    use_case: ResolveDatagramUseCase,
) -> anyhow::Result<()> {
    let socket = create_udp_socket(bind_addr)?;
    let mut resolver = ResolverLoop::new(socket, use_case);

    info!(bind_address = %bind_addr, "DNS server ready");

    resolver
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = resolver.use_case().stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        upstream_failures = stats.upstream_failures,
        dropped = stats.dropped,
        persistence_failures = stats.persistence_failures,
        "DNS server stopped"
    );

    Ok(())
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}
