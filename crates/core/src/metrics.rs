//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Identifier resolution (cache/service/scrape/failed)
//! - Provider searches and result volumes
//! - Retrieval fetches and format conversions

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Identifier Resolution
// =============================================================================

/// Metadata resolutions by source.
pub static METADATA_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subtonic_metadata_resolutions_total",
            "Total metadata resolutions",
        ),
        &["source"], // "cache", "service", "scrape", "failed"
    )
    .unwrap()
});

// =============================================================================
// Provider Search
// =============================================================================

/// Provider search outcomes.
pub static PROVIDER_SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subtonic_provider_searches_total",
            "Total provider searches",
        ),
        &["provider", "status"], // status: "ok", "empty", "failed"
    )
    .unwrap()
});

/// Records returned per aggregated search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subtonic_search_results",
            "Number of subtitle records returned per aggregated search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 40.0, 60.0]),
        &[],
    )
    .unwrap()
});

/// Aggregated search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subtonic_search_duration_seconds",
            "Duration of aggregated subtitle searches",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Retrieval
// =============================================================================

/// Retrieval fetch outcomes.
pub static FETCH_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subtonic_fetch_outcomes_total",
            "Total retrieval fetches by outcome",
        ),
        &["result"], // "complete", "truncated", "failed"
    )
    .unwrap()
});

/// Subtitle format conversions.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subtonic_conversions_total",
            "Total subtitle normalizations by path",
        ),
        &["result"], // "converted", "passthrough"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(METADATA_RESOLUTIONS.clone()),
        Box::new(PROVIDER_SEARCHES.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(FETCH_OUTCOMES.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
    ]
}
