//! Configuration schema definitions.
//!
//! One [`SiteConfig`] describes one site. The main file and every virtual
//! host file share this schema; listener-level fields are ignored for
//! virtual hosts. All types derive Serde traits for deserialization from
//! TOML.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for one site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listen address (e.g., "0.0.0.0").
    pub address: String,

    /// Listen port.
    pub port: u16,

    /// TLS listener settings.
    pub tls: TlsConfig,

    /// Local content and virtual hosting.
    pub serve: ServeConfig,

    /// Reverse-proxy rules.
    pub proxy: ProxyConfig,

    /// Firewall rules applied in proxy mode.
    pub firewall: FirewallConfig,

    /// Metrics endpoint.
    pub metrics: MetricsConfig,

    /// Logging and exporter settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
            tls: TlsConfig::default(),
            serve: ServeConfig::default(),
            proxy: ProxyConfig::default(),
            firewall: FirewallConfig::default(),
            metrics: MetricsConfig::default(),
            observability: ObservabilityConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Socket address string for the listener.
    pub fn listen_address(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Serve HTTPS instead of plain HTTP.
    pub enabled: bool,

    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Local content and virtual hosting.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Directory served for requests that are not proxied.
    pub root: Option<PathBuf>,

    /// Enable host-based selection of virtual host configs.
    pub virtual_hosting: bool,

    /// Host name -> path of that host's config file.
    pub virtual_hosts: HashMap<String, PathBuf>,
}

/// Reverse-proxy rules.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Request host -> upstream origin URL.
    pub rules: HashMap<String, String>,

    /// Forward the inbound Host header instead of the upstream authority.
    pub preserve_host: bool,
}

/// Firewall verdict for a single client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallAction {
    Allow,
    Deny,
}

/// Firewall rules.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Host scope ("*" for every host) -> client address -> action.
    pub rules: HashMap<String, HashMap<String, FirewallAction>>,
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Count requests and expose the report page.
    pub enabled: bool,

    /// Path prefix of the report page.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "/metrics".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Bind address of the Prometheus exporter; disabled when unset.
    pub prometheus_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
            prometheus_address: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for in-flight requests after a shutdown signal.
    pub shutdown_grace_secs: u64,

    /// Upper bound on an upstream round trip; unbounded when unset.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 30,
            upstream_secs: None,
        }
    }
}
