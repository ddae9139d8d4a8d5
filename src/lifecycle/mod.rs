//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load main config → Load vhost configs → Compile sites → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded grace) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
