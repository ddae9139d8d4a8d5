//! Network layer subsystem.
//!
//! Resolves the configured listen address for both listener kinds and
//! prepares the rustls configuration for HTTPS listeners.

pub mod address;
pub mod tls;

pub use address::resolve_listen_address;
pub use tls::load_tls_config;
