//! Types for the subtitle search system.

use serde::{Deserialize, Serialize};

/// Query parameters for a subtitle search, built once per request from
/// resolved metadata and threaded through every adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Resolved title text.
    pub title: String,
    /// Release year, used as a narrowing filter where the origin supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Canonical identifier, for origins that can search by it directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
}

/// One subtitle listing entry as parsed from an origin site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubtitleRecord {
    /// Adapter identity (registry key).
    pub provider: String,
    /// Adapter display name.
    pub provider_label: String,
    /// Opaque id meaningful only to this provider's download endpoint.
    pub external_id: String,
    /// Listing title as shown on the origin site.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_count: Option<String>,
}

/// Where to fetch one record's raw artifact. Pure data, no network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLocator {
    pub url: String,
    /// Origin-appropriate referer; some sites refuse downloads without it.
    pub referer: String,
}
