use cachedns_application::ports::CacheSnapshotRepository;
use cachedns_application::use_cases::{ResolveDatagramUseCase, ResolverSettings};
use cachedns_domain::CliOverrides;
use cachedns_infrastructure::dns::UdpTransport;
use cachedns_infrastructure::persistence::JsonSnapshotRepository;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "cachedns")]
#[command(version = "0.1.0")]
#[command(about = "CacheDNS - Caching UDP DNS forwarder")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS listen port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver (ip:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Upstream timeout in milliseconds
    #[arg(long)]
    upstream_timeout_ms: Option<u64>,

    /// Cache TTL in seconds
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Cache snapshot file
    #[arg(long, value_name = "FILE")]
    snapshot: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind,
        upstream: cli.upstream,
        upstream_timeout_ms: cli.upstream_timeout_ms,
        cache_ttl_secs: cli.cache_ttl,
        snapshot_path: cli.snapshot,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting CacheDNS v{}", env!("CARGO_PKG_VERSION"));

    let listen_addr = config.server.listen_addr()?;
    let upstream_addr = config.upstream.server_addr()?;

    let snapshots: Arc<dyn CacheSnapshotRepository> =
        Arc::new(JsonSnapshotRepository::new(&config.cache.snapshot_path));
    let store = ResolveDatagramUseCase::load_store(snapshots.as_ref(), config.cache.ttl_secs);

    info!(
        upstream = %upstream_addr,
        timeout_ms = config.upstream.timeout_ms,
        ttl_secs = config.cache.ttl_secs,
        snapshot = %config.cache.snapshot_path,
        cached = store.len(),
        "Resolver configured"
    );

    let use_case = ResolveDatagramUseCase::new(
        store,
        Arc::new(UdpTransport::new(upstream_addr)),
        snapshots,
        ResolverSettings {
            upstream_timeout: config.upstream.timeout(),
            servfail_on_error: config.upstream.servfail_on_error,
        },
    );

    server::start_dns_server(listen_addr, use_case).await?;

    info!("Server shutdown complete");
    Ok(())
}
