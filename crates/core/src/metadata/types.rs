//! Types for identifier resolution.

use serde::{Deserialize, Serialize};

/// What kind of title a canonical identifier points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment used by the metadata service.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }

    /// Parse the kind segment of an inbound request path.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaKind::Movie),
            "series" => Some(MediaKind::Series),
            _ => None,
        }
    }
}

/// A parsed composite identifier.
///
/// Season and episode are both present exactly when `kind` is `Series`;
/// `parse_media_id` upholds this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaReference {
    /// Opaque external identifier, e.g. `tt0133093`.
    pub canonical_id: String,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

/// Resolved title information, cached per canonical id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub kind: MediaKind,
}
