use anyhow::Context;
use clap::Parser;
use doh_gateway_domain::CliOverrides;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "doh-gateway")]
#[command(version)]
#[command(about = "DNS-over-HTTPS gateway forwarding RFC 8484 queries to a classic DNS upstream")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// HTTP listener port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Upstream resolver (address, host:port or DoH URL)
    #[arg(long, value_name = "SERVER")]
    upstream: Option<String>,

    /// Upstream protocol (udp, tcp, tls, https)
    #[arg(long)]
    protocol: Option<String>,

    /// Upstream query timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            http_port: self.port,
            upstream_server: self.upstream.clone(),
            upstream_protocol: self.protocol.clone(),
            timeout_ms: self.timeout_ms,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    bootstrap::init_logging(&config.logging);
    doh_gateway_infrastructure::dns::install_crypto_provider();

    if cli.check {
        info!(
            upstream = %config.upstream.endpoint()?,
            "Configuration is valid"
        );
        return Ok(());
    }

    info!("Starting DoH gateway v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DohServices::new(&config)?;

    let bind_ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_address))?;
    let bind_addr = SocketAddr::new(bind_ip, config.server.http_port);

    server::start_web_server(bind_addr, services.app_state, &config.server).await?;

    info!("Server shutdown complete");
    Ok(())
}
