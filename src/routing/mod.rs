//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host header or :authority)
//!     → host.rs (strip port, lowercase)
//!     → resolver.rs (virtual host lookup)
//!     → Return: the Site serving this request
//!
//! Site Compilation (at startup):
//!     SiteConfig (main + vhosts)
//!     → site.rs (compile proxy rules and firewall)
//!     → Freeze as immutable VirtualHosts
//! ```
//!
//! # Design Decisions
//! - Sites compiled at startup, immutable at runtime
//! - Deterministic: same host always resolves to the same site
//! - Unmatched hosts use the main site

pub mod host;
pub mod resolver;
pub mod site;

pub use host::{request_host, strip_port};
pub use resolver::VirtualHosts;
pub use site::Site;
