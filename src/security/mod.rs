//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request (client address, target host):
//!     → firewall.rs (per-host allow/deny)
//!     → Deny: 403, upstream never contacted
//!     → Allow: continue to proxy::forwarder
//! ```
//!
//! # Design Decisions
//! - Only proxied requests are checked; local content is not firewalled
//! - Rules are compiled per site at startup

pub mod firewall;

pub use firewall::Firewall;
