//! Per-request dispatch.
//!
//! ```text
//! resolve vhost
//!     → proxy rule for host?
//!         yes → firewall → 403 | forward → upstream response | 502
//!         no  → local content
//!     → record (status, path) exactly once
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::http::local;
use crate::http::response::error_response;
use crate::http::server::Runtime;
use crate::proxy::ForwardOutcome;
use crate::routing::request_host;

/// Entry point for every request outside the metrics path.
pub async fn dispatch(
    State(runtime): State<Arc<Runtime>>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::debug_span!("request", id = %request_id);
    handle(&runtime, client_addr, req).instrument(span).await
}

/// Resolve, forward or serve locally, then record the final status.
pub async fn handle(runtime: &Runtime, client_addr: SocketAddr, req: Request<Body>) -> Response {
    let path = req.uri().path().to_string();
    let host = request_host(&req);
    let site = runtime.hosts().resolve(&host);

    tracing::debug!(
        method = %req.method(),
        host = %host,
        path = %path,
        site = site.name(),
        "Dispatching request"
    );

    let response = match runtime.forwarder().forward(site, &host, client_addr, req).await {
        ForwardOutcome::Forwarded(response) => response,
        ForwardOutcome::Failed(e) => error_response(e.status_code()),
        ForwardOutcome::NotProxied(req) => local::serve(site, req).await,
    };

    runtime.metrics().record(response.status().as_u16(), &path);
    response
}

/// HTML report of the request counters.
pub async fn metrics_page(State(runtime): State<Arc<Runtime>>) -> Response {
    let mut page = String::new();
    if let Err(e) = runtime.metrics().render(&mut page) {
        tracing::error!(error = %e, "Failed to render metrics");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR);
    }
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))],
        page,
    )
        .into_response()
}

/// Send `<metrics-path>` to `<metrics-path>/`.
pub async fn metrics_redirect(State(runtime): State<Arc<Runtime>>) -> Response {
    let location = format!("{}/", runtime.hosts().main().metrics_path());
    match HeaderValue::from_str(&location) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
        Err(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
