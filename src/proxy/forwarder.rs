//! Reverse-proxy forwarding.
//!
//! # Responsibilities
//! - Decide whether a request is proxied (a rule exists for its host)
//! - Run the firewall before any upstream call
//! - Rebuild the request against the upstream origin and stream it out
//! - Relay status, Content-Type, Content-Length and the streamed body back
//!
//! # Design Decisions
//! - One shared client for all requests (connection pooling)
//! - Request headers: clone the inbound map, then apply the Host policy
//! - Response headers: start empty, then copy the allow-list
//! - Bodies are never buffered in either direction
//! - No retries; a failed request is terminal

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{header, HeaderName, Request, Response, Uri};
use hyper::body::Incoming;

use crate::error::ProxyError;
use crate::observability::logging::NETWORK_TARGET;
use crate::proxy::upstream::{Upstream, UpstreamClient};
use crate::routing::Site;

/// Upstream response headers relayed to the client. Everything else is dropped.
pub const RELAYED_HEADERS: [HeaderName; 2] = [header::CONTENT_TYPE, header::CONTENT_LENGTH];

/// Address of the client that sent the inbound request, attached to the
/// outbound request's extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);

/// Result of offering a request to the forwarder.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// No proxy rule for the host; the request is handed back untouched.
    NotProxied(Request<Body>),
    /// Upstream answered; the response is ready to send.
    Forwarded(Response<Body>),
    /// Blocked or failed before any response was committed.
    Failed(ProxyError),
}

/// Forwards requests to upstream origins through a shared client.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    upstream_timeout: Option<Duration>,
}

impl Forwarder {
    pub fn new(client: UpstreamClient, upstream_timeout: Option<Duration>) -> Self {
        Self {
            client,
            upstream_timeout,
        }
    }

    /// Proxy `req` if `site` has a rule for `host` (port-stripped,
    /// lowercased).
    pub async fn forward(
        &self,
        site: &Site,
        host: &str,
        client_addr: SocketAddr,
        req: Request<Body>,
    ) -> ForwardOutcome {
        let Some(upstream) = site.upstream(host) else {
            return ForwardOutcome::NotProxied(req);
        };

        // Dual-stack listeners report IPv4 peers as `::ffff:a.b.c.d`.
        let client_ip = client_addr.ip().to_canonical().to_string();
        if site.firewall().is_blocked(&client_ip, host) {
            tracing::warn!(
                client = %client_ip,
                host = %host,
                site = site.name(),
                "Request blocked by firewall"
            );
            return ForwardOutcome::Failed(ProxyError::FirewallBlock {
                client: client_ip,
                host: host.to_string(),
            });
        }

        let method = req.method().clone();
        let uri = req.uri().clone();

        let outbound = match build_upstream_request(
            upstream,
            site.config().proxy.preserve_host,
            client_addr,
            req,
        ) {
            Ok(outbound) => outbound,
            Err(e) => {
                tracing::error!(error = %e, host = %host, "Failed to build upstream request");
                return ForwardOutcome::Failed(e);
            }
        };

        match self.execute(upstream, outbound).await {
            Ok(response) => {
                let response = relay_response(response);
                tracing::info!(
                    target: NETWORK_TARGET,
                    status = response.status().as_u16(),
                    method = %method,
                    host = %host,
                    uri = %uri,
                    client = %client_ip,
                    upstream = %upstream,
                    "Proxied request"
                );
                ForwardOutcome::Forwarded(response)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    method = %method,
                    host = %host,
                    uri = %uri,
                    client = %client_ip,
                    "Upstream request failed"
                );
                ForwardOutcome::Failed(e)
            }
        }
    }

    async fn execute(
        &self,
        upstream: &Upstream,
        outbound: Request<Body>,
    ) -> Result<Response<Incoming>, ProxyError> {
        let unreachable = |source| ProxyError::UpstreamUnreachable {
            upstream: upstream.to_string(),
            source,
        };

        match self.upstream_timeout {
            None => self.client.request(outbound).await.map_err(unreachable),
            Some(limit) => match tokio::time::timeout(limit, self.client.request(outbound)).await {
                Ok(result) => result.map_err(unreachable),
                Err(_) => Err(ProxyError::UpstreamTimeout {
                    upstream: upstream.to_string(),
                    timeout_secs: limit.as_secs(),
                }),
            },
        }
    }
}

/// Rebuild an inbound request against `upstream`.
///
/// Method, path, raw query and headers (multi-value included) are kept
/// verbatim and the body is moved, not read. The inbound `Host` header is
/// dropped unless `preserve_host` is set, so the client derives it from the
/// upstream authority.
pub fn build_upstream_request(
    upstream: &Upstream,
    preserve_host: bool,
    client_addr: SocketAddr,
    req: Request<Body>,
) -> Result<Request<Body>, ProxyError> {
    let malformed = |source| ProxyError::MalformedUpstreamRequest {
        upstream: upstream.to_string(),
        source,
    };

    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    let uri = Uri::builder()
        .scheme(upstream.scheme().clone())
        .authority(upstream.authority().clone())
        .path_and_query(path_and_query)
        .build()
        .map_err(malformed)?;

    let mut headers = parts.headers;
    if !preserve_host {
        headers.remove(header::HOST);
    }

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(uri)
        .body(body)
        .map_err(malformed)?;
    *outbound.headers_mut() = headers;
    outbound.extensions_mut().insert(ClientAddr(client_addr));

    Ok(outbound)
}

/// Turn an upstream response into the client response.
pub fn relay_response(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    for name in RELAYED_HEADERS {
        if let Some(value) = parts.headers.get(&name) {
            response.headers_mut().insert(name, value.clone());
        }
    }
    response
}
