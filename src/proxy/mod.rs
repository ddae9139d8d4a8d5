//! Reverse-proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Request + resolved Site
//!     → forwarder.rs (rule lookup, firewall, request rebuild)
//!     → upstream.rs (shared pooled client, origin parsing)
//!     → Upstream server
//!     → forwarder.rs (status + allow-listed headers + streamed body)
//! ```

pub mod forwarder;
pub mod upstream;

pub use forwarder::{ClientAddr, ForwardOutcome, Forwarder};
pub use upstream::{build_client, Upstream, UpstreamClient};
