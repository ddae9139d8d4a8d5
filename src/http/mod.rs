//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, listener, graceful shutdown)
//!     → dispatcher.rs (vhost → firewall → forward | local → metrics)
//!     → local.rs (static files when no proxy rule applies)
//!     → response.rs (server-generated error pages)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod local;
pub mod response;
pub mod server;

pub use server::{EdgeServer, Runtime};
