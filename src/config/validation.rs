//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Proxy rule URLs must be absolute http(s) origins
//! - Metrics path and listener values must be usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: SiteConfig → Result<(), Vec<ValidationError>>
//! - Virtual host files skip listener-level checks

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::SiteConfig;

/// Characters the router reads as parameter or wildcard syntax.
const ROUTE_SYNTAX: [char; 4] = ['{', '}', '*', ':'];

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the main configuration, including listener settings.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port == 0 {
        errors.push(ValidationError::new("port", "must not be 0"));
    }
    if config.tls.enabled {
        if config.tls.cert_path.as_os_str().is_empty() {
            errors.push(ValidationError::new("tls.cert_path", "required when TLS is enabled"));
        }
        if config.tls.key_path.as_os_str().is_empty() {
            errors.push(ValidationError::new("tls.key_path", "required when TLS is enabled"));
        }
    }
    if config.serve.virtual_hosting {
        for (host, path) in &config.serve.virtual_hosts {
            if host.is_empty() {
                errors.push(ValidationError::new("serve.virtual_hosts", "host must not be empty"));
            }
            if !path.exists() {
                errors.push(ValidationError::new(
                    format!("serve.virtual_hosts.{}", host),
                    format!("file {} does not exist", path.display()),
                ));
            }
        }
    }
    if config.metrics.enabled {
        let path = &config.metrics.path;
        if !path.starts_with('/') {
            errors.push(ValidationError::new("metrics.path", "must start with '/'"));
        } else if path.trim_end_matches('/').is_empty() {
            errors.push(ValidationError::new("metrics.path", "must not be the site root"));
        } else if path.contains(&ROUTE_SYNTAX[..]) {
            errors.push(ValidationError::new(
                "metrics.path",
                "must not contain '{', '}', '*' or ':'",
            ));
        }
    }
    if let Some(addr) = &config.observability.prometheus_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.prometheus_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    check_site_rules(config, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate a virtual host configuration.
pub fn validate_vhost_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_site_rules(config, &mut errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Checks shared by main and virtual host configs.
fn check_site_rules(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    for (host, target) in &config.proxy.rules {
        if host.is_empty() {
            errors.push(ValidationError::new("proxy.rules", "host must not be empty"));
        }
        let field = format!("proxy.rules.{}", host);
        match Url::parse(target) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError::new(
                        field,
                        format!("unsupported scheme '{}'", url.scheme()),
                    ));
                } else if url.host_str().is_none() {
                    errors.push(ValidationError::new(field, "upstream URL has no host"));
                }
            }
            Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
        }
    }

    for (scope, clients) in &config.firewall.rules {
        if clients.keys().any(|client| client.is_empty()) {
            errors.push(ValidationError::new(
                format!("firewall.rules.{}", scope),
                "client address must not be empty",
            ));
        }
    }
}
