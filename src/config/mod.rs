//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! main config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!
//! serve.virtual_hosts entries
//!     → loader.rs (one SiteConfig per host file)
//!     → validation.rs (site-level checks only)
//!     → compiled into routing::Site at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    FirewallAction, FirewallConfig, LogFormat, MetricsConfig, ObservabilityConfig, ProxyConfig,
    ServeConfig, SiteConfig, TimeoutConfig, TlsConfig,
};
