//! Host name extraction and normalization.
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110), so hosts are lowercased
//! - Missing Host header falls back to the URI authority (HTTP/2 :authority)
//! - Bracketed IPv6 literals lose their brackets along with the port

use axum::http::{header, Request};

/// Strip a trailing `:port` from a host or address.
///
/// Bare IPv6 literals (more than one colon, no brackets) are returned as-is.
pub fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => host,
        };
    }
    match host.split_once(':') {
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}

/// The port-stripped, lowercased target host of a request.
pub fn request_host<B>(req: &Request<B>) -> String {
    let raw = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or("");
    strip_port(raw).to_ascii_lowercase()
}
