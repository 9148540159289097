//! Prometheus registry owned by the application state.
//!
//! Carries the process collector (Linux only) and the
//! `http_requests_total{method, route, status}` counter fed by the request
//! pipeline. Nothing reads the counters back except the `/metrics` scrape.

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

/// Label used when a request matched no declared route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
}

impl Metrics {
    /// Build a fresh registry with default process metrics and the HTTP
    /// request counter registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
        })
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Snapshot every registered family in text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
