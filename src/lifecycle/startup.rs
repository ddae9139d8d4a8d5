//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the main configuration
//! - Load every virtual host file and compile all sites
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal
//! - Sites are built completely before the router exists, so request tasks
//!   only ever see the frozen set

use std::collections::HashMap;
use std::path::Path;

use crate::config::loader::{load_config, load_vhost_config};
use crate::config::SiteConfig;
use crate::error::ConfigError;
use crate::routing::{Site, VirtualHosts};

/// Compile the main site and, when virtual hosting is on, every vhost it
/// names.
pub fn build_hosts(main: SiteConfig) -> Result<VirtualHosts, ConfigError> {
    let mut vhosts = HashMap::new();
    if main.serve.virtual_hosting {
        for (host, path) in &main.serve.virtual_hosts {
            let config = load_vhost_config(path)?;
            tracing::info!(host = %host, path = %path.display(), "Loaded virtual host");
            vhosts.insert(host.clone(), Site::compile(host.clone(), config)?);
        }
    }

    let main = Site::compile("main", main)?;
    Ok(VirtualHosts::new(main, vhosts))
}

/// Load the main configuration file and build every site from it.
pub fn load_hosts(path: &Path) -> Result<VirtualHosts, ConfigError> {
    build_hosts(load_config(path)?)
}
