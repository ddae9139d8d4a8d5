//! HTTP(S) edge server library.
//!
//! Serves static sites, forwards configured hosts to upstream servers,
//! applies a per-host client firewall and keeps per-status request counts.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::SiteConfig;
pub use http::EdgeServer;
pub use lifecycle::Shutdown;
