//! Edge server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener ──▶ dispatcher ──▶ vhost resolver
//!                     (TCP/TLS)        │
//!                                      ▼
//!                             proxy rule for Host? ──no──▶ static files
//!                                      │ yes
//!                                      ▼
//!                                  firewall ──deny──▶ 403
//!                                      │ allow
//!                                      ▼
//!                                  forwarder ──────────▶ Upstream
//!                                      │
//!     Client Response                  ▼
//!     ◀────────────── metrics.record(status, path)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use edge_server::config::loader::load_config;
use edge_server::config::ObservabilityConfig;
use edge_server::error::EdgeError;
use edge_server::lifecycle::signals::wait_for_signal;
use edge_server::lifecycle::startup::build_hosts;
use edge_server::net::{load_tls_config, resolve_listen_address};
use edge_server::observability::{logging, metrics};
use edge_server::{EdgeServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-server", version, about = "HTTP(S) edge server")]
struct Cli {
    /// Main configuration file
    #[arg(short, long, default_value = "edge-server.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-server starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "edge-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: edge_server::SiteConfig) -> Result<(), EdgeError> {
    if let Some(address) = &config.observability.prometheus_address {
        let addr: SocketAddr = address.parse().map_err(|source| EdgeError::ListenAddress {
            address: address.clone(),
            source,
        })?;
        metrics::install_exporter(addr)?;
    }

    let address = config.listen_address();
    let tls = config.tls.clone();
    let hosts = build_hosts(config)?;
    let server = EdgeServer::new(hosts);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let addr = resolve_listen_address(&address).await?;
    if tls.enabled {
        let rustls = load_tls_config(&tls).await?;
        server.run_tls(addr, rustls, receiver).await
    } else {
        let listener = TcpListener::bind(addr).await?;
        server.run(listener, receiver).await
    }
}
