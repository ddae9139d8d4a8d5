//! Request metrics collection and exposition.
//!
//! # Responsibilities
//! - Count responses per status code and request path
//! - Render the HTML report served under the metrics path
//! - Mirror status counts to the `metrics` facade for Prometheus
//!
//! # Metrics
//! - `edge_requests_total` (counter): responses by status code
//!
//! # Design Decisions
//! - One mutex guards both the status/path map and the total counter
//! - Rendering formats a cloned snapshot; nothing is written under the lock
//! - Report ordering is unspecified (HashMap iteration order)

use std::collections::HashMap;
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Counts per status code and path, plus the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub paths: HashMap<u16, HashMap<String, u64>>,
}

impl MetricsSnapshot {
    /// Count recorded for one status and path.
    pub fn count(&self, status: u16, path: &str) -> u64 {
        self.paths
            .get(&status)
            .and_then(|paths| paths.get(path))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over every path recorded with `status`.
    pub fn status_total(&self, status: u16) -> u64 {
        self.paths
            .get(&status)
            .map(|paths| paths.values().sum())
            .unwrap_or(0)
    }
}

/// Concurrency-safe request counter.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    enabled: bool,
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsAggregator {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count one response. No-op when metrics are disabled.
    pub fn record(&self, status: u16, path: &str) {
        if !self.enabled {
            return;
        }
        {
            let mut inner = self.lock();
            *inner
                .paths
                .entry(status)
                .or_default()
                .entry(path.to_string())
                .or_insert(0) += 1;
            inner.total_requests += 1;
        }
        ::metrics::counter!("edge_requests_total", "status" => status.to_string()).increment(1);
    }

    /// Consistent copy of the current counts.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    /// Write the HTML report to `sink`.
    pub fn render<W: Write>(&self, sink: &mut W) -> std::fmt::Result {
        let snapshot = self.snapshot();

        write!(
            sink,
            "<h1>edge-server metrics</h1><br><b>Total requests:</b> {}<br>",
            snapshot.total_requests
        )?;
        for (status, paths) in &snapshot.paths {
            write!(sink, "<br><b>{}</b><ul>", status)?;
            for (path, count) in paths {
                write!(sink, "<li>Amount: {} - Path: {}</li>", count, escape_html(path))?;
            }
            sink.write_str("</ul>")?;
        }
        Ok(())
    }

    // Poisoning is ignored; no update leaves the counters half-written.
    fn lock(&self) -> MutexGuard<'_, MetricsSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Install the Prometheus exporter listening on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}
