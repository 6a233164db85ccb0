//! Test utilities: mock provider and record fixtures.
//!
//! Compiled into the library (not behind `cfg(test)`) so the server crate's
//! integration tests can drive the full stack without touching the network.

mod mock_provider;

pub use mock_provider::MockProvider;

/// Ready-made fixtures for tests.
pub mod fixtures {
    use crate::provider::SubtitleRecord;

    /// A minimal subtitle record for one provider.
    pub fn record(provider: &str, external_id: &str, title: &str) -> SubtitleRecord {
        SubtitleRecord {
            provider: provider.to_string(),
            provider_label: provider.to_string(),
            external_id: external_id.to_string(),
            title: title.to_string(),
            year: None,
            frame_rate: None,
            uploader: None,
            download_count: None,
        }
    }

    /// A record with the optional listing fields filled in.
    pub fn detailed_record(provider: &str, external_id: &str, title: &str) -> SubtitleRecord {
        SubtitleRecord {
            year: Some("1999".to_string()),
            frame_rate: Some("25".to_string()),
            uploader: Some("uploader".to_string()),
            download_count: Some("100".to_string()),
            ..record(provider, external_id, title)
        }
    }
}
