//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher (every terminal response):
//!     → metrics.rs (status/path counters)
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → HTML report at <metrics-path>/
//!     → Prometheus scrape (optional exporter)
//!     → stdout log lines
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsAggregator, MetricsSnapshot};
