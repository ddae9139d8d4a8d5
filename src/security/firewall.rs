//! Firewall decisions for proxied requests.
//!
//! # Responsibilities
//! - Decide allow/deny for a (client address, target host) pair
//! - Evaluated before any upstream call is attempted
//!
//! # Design Decisions
//! - Client addresses match by exact string comparison
//! - A rule scoped to the exact host wins over the "*" scope
//! - No matching rule means allow

use std::collections::HashMap;

use crate::config::{FirewallAction, FirewallConfig};

/// Scope key that applies to every host of a site.
pub const ANY_HOST: &str = "*";

/// Compiled firewall rules of one site.
#[derive(Debug, Clone, Default)]
pub struct Firewall {
    /// Host scope -> client address -> action.
    scopes: HashMap<String, HashMap<String, FirewallAction>>,
}

impl Firewall {
    pub fn from_config(config: &FirewallConfig) -> Self {
        let scopes = config
            .rules
            .iter()
            .map(|(host, clients)| (host.to_ascii_lowercase(), clients.clone()))
            .collect();
        Self { scopes }
    }

    /// Action for `client` requesting `host`.
    pub fn decide(&self, client: &str, host: &str) -> FirewallAction {
        self.scopes
            .get(host)
            .and_then(|clients| clients.get(client))
            .or_else(|| {
                self.scopes
                    .get(ANY_HOST)
                    .and_then(|clients| clients.get(client))
            })
            .copied()
            .unwrap_or(FirewallAction::Allow)
    }

    /// True when the request must be rejected with 403.
    pub fn is_blocked(&self, client: &str, host: &str) -> bool {
        self.decide(client, host) == FirewallAction::Deny
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
