//! Error types for the edge server.
//!
//! Configuration errors are fatal and only surface at startup. Proxy errors
//! are per-request and always map to a status code; they never take the
//! process down.

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration in {path}: {}", join_errors(.errors))]
    Validation {
        path: String,
        errors: Vec<ValidationError>,
    },

    #[error("virtual host {host}: {reason}")]
    VirtualHost { host: String, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-request failures of the reverse-proxy path.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("client {client} is blocked for host {host}")]
    FirewallBlock { client: String, host: String },

    #[error("malformed upstream request to {upstream}: {source}")]
    MalformedUpstreamRequest {
        upstream: String,
        #[source]
        source: axum::http::Error,
    },

    #[error("upstream {upstream} unreachable: {source}")]
    UpstreamUnreachable {
        upstream: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("upstream {upstream} did not answer within {timeout_secs}s")]
    UpstreamTimeout { upstream: String, timeout_secs: u64 },
}

impl ProxyError {
    /// Status code the client receives for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::FirewallBlock { .. } => StatusCode::FORBIDDEN,
            ProxyError::MalformedUpstreamRequest { .. }
            | ProxyError::UpstreamUnreachable { .. }
            | ProxyError::UpstreamTimeout { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Top-level errors from startup and serving.
#[derive(Error, Debug)]
pub enum EdgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address {address}: {source}")]
    ListenAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("cannot resolve listen address {address}: {source}")]
    UnresolvedAddress {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),

    #[error("metrics exporter failed: {0}")]
    Exporter(#[from] metrics_exporter_prometheus::BuildError),
}
