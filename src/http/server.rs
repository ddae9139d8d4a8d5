//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Own the runtime state shared by all request tasks
//! - Create the Axum Router (metrics page + dispatch fallback)
//! - Serve plain HTTP or TLS on the configured listener
//! - Drain in-flight requests on shutdown, bounded by a grace period

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::trace::TraceLayer;

use crate::config::validation::validate_config;
use crate::config::SiteConfig;
use crate::error::{ConfigError, EdgeError};
use crate::http::dispatcher::{dispatch, metrics_page, metrics_redirect};
use crate::observability::MetricsAggregator;
use crate::proxy::{build_client, Forwarder};
use crate::routing::{Site, VirtualHosts};

/// Live server state, shared by every request task.
///
/// Sites are frozen at construction; only the metrics counters change.
pub struct Runtime {
    hosts: VirtualHosts,
    metrics: MetricsAggregator,
    forwarder: Forwarder,
}

impl Runtime {
    /// Build the runtime. Metrics and the upstream timeout follow the main
    /// site's configuration.
    pub fn new(hosts: VirtualHosts) -> Self {
        let main = hosts.main().config();
        let metrics = MetricsAggregator::new(main.metrics.enabled);
        let upstream_timeout = main.timeouts.upstream_secs.map(Duration::from_secs);
        let forwarder = Forwarder::new(build_client(), upstream_timeout);

        Self {
            hosts,
            metrics,
            forwarder,
        }
    }

    pub fn hosts(&self) -> &VirtualHosts {
        &self.hosts
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }
}

/// HTTP(S) edge server.
pub struct EdgeServer {
    router: Router,
    runtime: Arc<Runtime>,
    grace: Duration,
}

impl EdgeServer {
    /// Create a server for a resolved set of sites.
    pub fn new(hosts: VirtualHosts) -> Self {
        let grace = Duration::from_secs(hosts.main().config().timeouts.shutdown_grace_secs);
        let runtime = Arc::new(Runtime::new(hosts));
        let router = Self::build_router(Arc::clone(&runtime));

        Self {
            router,
            runtime,
            grace,
        }
    }

    /// Create a server for a single in-memory site without virtual hosts.
    pub fn from_config(config: SiteConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(|errors| ConfigError::Validation {
            path: "<inline>".to_string(),
            errors,
        })?;
        Ok(Self::new(VirtualHosts::single(Site::compile("main", config)?)))
    }

    /// Build the Axum router. The metrics page is only routed when enabled.
    fn build_router(runtime: Arc<Runtime>) -> Router {
        let mut router = Router::new();

        let main = runtime.hosts().main();
        if main.config().metrics.enabled {
            let base = main.metrics_path();
            router = router
                .route(base, any(metrics_redirect))
                .route(&format!("{}/", base), any(metrics_page))
                .route(&format!("{}/{{*rest}}", base), any(metrics_page));
        }

        router
            .fallback(dispatch)
            .with_state(runtime)
            .layer(TraceLayer::new_for_http())
    }

    /// Shared runtime state (metrics, sites).
    pub fn runtime(&self) -> Arc<Runtime> {
        Arc::clone(&self.runtime)
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), EdgeError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            vhosts = self.runtime.hosts().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let (draining_tx, draining_rx) = oneshot::channel();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
                let _ = draining_tx.send(());
            })
            .into_future();

        drain_with_grace(serve, draining_rx, self.grace).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), EdgeError> {
        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        let grace = self.grace;
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received, draining connections");
            signal_handle.graceful_shutdown(Some(grace));
        });

        tracing::info!(
            address = %addr,
            vhosts = self.runtime.hosts().len(),
            "HTTPS server starting"
        );
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Await `serve`; once draining starts, allow at most `grace` more.
async fn drain_with_grace<F>(
    serve: F,
    draining: oneshot::Receiver<()>,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result,
        started = draining => {
            if started.is_err() {
                return serve.await;
            }
        }
    }

    match tokio::time::timeout(grace, serve).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, dropping in-flight requests"
            );
            Ok(())
        }
    }
}
