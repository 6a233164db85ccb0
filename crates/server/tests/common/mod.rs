//! Common test utilities for E2E testing with mocks.
//!
//! Builds an in-process router around mock providers and (optionally) stub
//! upstream HTTP servers, so the full stack can be exercised without any
//! real network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use subtonic_core::testing::MockProvider;
use subtonic_core::{
    Config, MetadataResolver, ProviderRegistry, RetrievalProxy, SubtitleAggregator,
    SubtitleProvider,
};
use subtonic_server::api::create_router;
use subtonic_server::state::AppState;

/// Re-export fixtures for test convenience
pub use subtonic_core::testing::fixtures;

/// A routable-but-dead local port, so upstream calls fail fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Test fixture for E2E testing with mock dependencies.
///
/// The registered providers are plain `MockProvider`s shared via `Arc`, so a
/// test can configure results after the router has been built.
pub struct TestFixture {
    pub router: Router,
    pub providers: Vec<Arc<MockProvider>>,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture with default mocks and unreachable upstreams: metadata
    /// resolution fails, mock download locators point nowhere.
    pub async fn new() -> Self {
        Self::build(UNREACHABLE, default_mocks()).await
    }

    /// Fixture whose metadata resolver talks to the given stub service.
    pub async fn with_metadata_service(service_url: &str) -> Self {
        Self::build(service_url, default_mocks()).await
    }

    /// Fixture with caller-supplied mock providers.
    pub async fn with_mocks(service_url: &str, mocks: Vec<MockProvider>) -> Self {
        Self::build(service_url, mocks).await
    }

    async fn build(service_url: &str, mocks: Vec<MockProvider>) -> Self {
        let mut config = Config::default();
        config.metadata.service_url = service_url.to_string();
        config.metadata.fallback_url = UNREACHABLE.to_string();
        config.metadata.timeout_secs = 2;
        config.retrieval.timeout_secs = 2;

        let providers: Vec<Arc<MockProvider>> = mocks.into_iter().map(Arc::new).collect();
        let mut registry = ProviderRegistry::new();
        for provider in &providers {
            registry.register(Arc::clone(provider) as Arc<dyn SubtitleProvider>);
        }
        let registry = Arc::new(registry);

        let resolver = MetadataResolver::new(&config.metadata).expect("Failed to create resolver");
        let aggregator = SubtitleAggregator::new(Arc::clone(&registry));
        let proxy = RetrievalProxy::new(Arc::clone(&registry), &config.retrieval);

        let state = Arc::new(AppState::new(config, resolver, aggregator, proxy));
        let router = create_router(state);

        Self { router, providers }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .expect("Failed to build request"),
            )
            .await
            .expect("Request failed");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            body,
            text,
        }
    }
}

fn default_mocks() -> Vec<MockProvider> {
    vec![
        MockProvider::new("subsunacs", "Subsunacs.net"),
        MockProvider::new("yavka", "Yavka.net"),
    ]
}

/// Spawn an in-process stub HTTP server and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server died");
    });
    format!("http://{}", addr)
}

/// Build an in-memory ZIP with the given entries.
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).expect("zip entry");
        writer.write_all(content).expect("zip write");
    }
    writer.finish().expect("zip finish").into_inner()
}
