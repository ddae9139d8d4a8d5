//! Compiled per-site configuration.

use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::error::ConfigError;
use crate::proxy::upstream::Upstream;
use crate::security::firewall::Firewall;

/// A validated [`SiteConfig`] with its proxy and firewall tables compiled
/// for lookup on the hot path.
#[derive(Debug, Clone)]
pub struct Site {
    name: String,
    config: SiteConfig,
    upstreams: HashMap<String, Upstream>,
    firewall: Firewall,
}

impl Site {
    /// Compile a site. `name` is "main" or the virtual host name.
    pub fn compile(name: impl Into<String>, config: SiteConfig) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut upstreams = HashMap::with_capacity(config.proxy.rules.len());
        for (host, target) in &config.proxy.rules {
            let upstream = Upstream::parse(target).map_err(|reason| ConfigError::VirtualHost {
                host: name.clone(),
                reason: format!("proxy rule for {}: {}", host, reason),
            })?;
            upstreams.insert(host.to_ascii_lowercase(), upstream);
        }
        let firewall = Firewall::from_config(&config.firewall);

        Ok(Self {
            name,
            config,
            upstreams,
            firewall,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Upstream origin for a normalized request host, if proxied.
    pub fn upstream(&self, host: &str) -> Option<&Upstream> {
        self.upstreams.get(host)
    }

    pub fn firewall(&self) -> &Firewall {
        &self.firewall
    }

    /// Metrics path without a trailing slash.
    pub fn metrics_path(&self) -> &str {
        self.config.metrics.path.trim_end_matches('/')
    }
}
