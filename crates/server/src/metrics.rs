//! Prometheus metrics for observability.
//!
//! The server owns the registry; core collectors are pulled in via
//! `grabbit_core::metrics::all_metrics()` and rendered at `/metrics`.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP requests by method, path and status class.
pub static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("grabbit_http_requests_total", "HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS.clone()))
        .expect("failed to register HTTP metrics");

    for metric in grabbit_core::metrics::all_metrics() {
        registry
            .register(metric)
            .expect("failed to register core metrics");
    }
}

/// Render the registry in the Prometheus text exposition format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
