//! Prometheus metrics for the HTTP surface.
//!
//! Core pipeline metrics are registered alongside the server's own request
//! counters in one registry, exposed at `/metrics`.

use std::time::Instant;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subtonic_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subtonic_http_requests_total", "Total HTTP requests"),
        &["method", "status"],
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    for metric in subtonic_core::metrics::all_metrics() {
        // Duplicate registration is fine across test routers sharing the
        // static registry.
        let _ = registry.register(metric);
    }
    let _ = registry.register(Box::new(HTTP_REQUEST_DURATION.clone()));
    let _ = registry.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
}

/// Axum middleware recording per-request counters and latency.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &status])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &status])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// GET /metrics
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response();
    }

    match String::from_utf8(buffer) {
        Ok(body) => body.into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Metrics were not valid UTF-8: {}", e),
        )
            .into_response(),
    }
}
