//! Virtual host resolution.
//!
//! # Responsibilities
//! - Hold the main site and every virtual host site
//! - Map a request host to the site that serves it
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) host lookup via HashMap
//! - Unknown hosts fall back to the main site rather than erroring

use std::collections::HashMap;

use crate::routing::site::Site;

/// The main site plus its virtual hosts.
#[derive(Debug)]
pub struct VirtualHosts {
    main: Site,
    vhosts: HashMap<String, Site>,
    enabled: bool,
}

impl VirtualHosts {
    /// Build the resolver. Virtual hosting follows the main site's
    /// `serve.virtual_hosting` flag.
    pub fn new(main: Site, vhosts: HashMap<String, Site>) -> Self {
        let enabled = main.config().serve.virtual_hosting;
        let vhosts = vhosts
            .into_iter()
            .map(|(host, site)| (host.to_ascii_lowercase(), site))
            .collect();
        Self {
            main,
            vhosts,
            enabled,
        }
    }

    /// A resolver that only knows the main site.
    pub fn single(main: Site) -> Self {
        Self::new(main, HashMap::new())
    }

    /// Site for a port-stripped, lowercased host.
    pub fn resolve(&self, host: &str) -> &Site {
        if !self.enabled {
            return &self.main;
        }
        self.vhosts.get(host).unwrap_or(&self.main)
    }

    pub fn main(&self) -> &Site {
        &self.main
    }

    pub fn len(&self) -> usize {
        self.vhosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vhosts.is_empty()
    }
}
