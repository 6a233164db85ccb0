//! Subtitle search endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use subtonic_core::{
    parse_media_id, MediaKind, ResolveError, SearchRequest, SubtitleRecord,
};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Serialize)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleEntry>,
}

#[derive(Serialize)]
pub struct SubtitleEntry {
    #[serde(flatten)]
    pub record: SubtitleRecord,
    /// Server-relative download path for this record.
    pub url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /subtitles/{kind}/{id}
///
/// The id segment is the composite identifier, optionally suffixed with
/// `.json` (addon clients request it that way). Identifier parse failures
/// are the caller's fault (400); a failed metadata resolution degrades to an
/// empty list rather than an error.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<SubtitlesResponse>, impl IntoResponse> {
    let Some(kind) = MediaKind::parse(&kind) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown media kind: {}", kind),
            }),
        ));
    };

    let composite = id.strip_suffix(".json").unwrap_or(&id);
    let reference = match parse_media_id(composite) {
        Ok(reference) => reference,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    let metadata = match state
        .resolver()
        .resolve(&reference.canonical_id, Some(kind))
        .await
    {
        Ok(metadata) => metadata,
        Err(ResolveError::MetadataUnavailable(id)) => {
            // No title to search with; an empty list beats an error here.
            warn!(id = %id, "Metadata unavailable; returning empty subtitle list");
            return Ok(Json(SubtitlesResponse {
                subtitles: Vec::new(),
            }));
        }
        Err(e) => {
            warn!(id = %reference.canonical_id, error = %e, "Resolution failed; returning empty subtitle list");
            return Ok(Json(SubtitlesResponse {
                subtitles: Vec::new(),
            }));
        }
    };

    let request = SearchRequest {
        title: metadata.title.clone(),
        year: metadata.year,
        season: reference.season,
        episode: reference.episode,
        canonical_id: Some(reference.canonical_id.clone()),
    };

    let records = state.aggregator().search_all(&request).await;
    info!(
        id = %reference.canonical_id,
        title = %metadata.title,
        results = records.len(),
        "Subtitle search complete"
    );

    Ok(Json(SubtitlesResponse {
        subtitles: records
            .into_iter()
            .map(|record| {
                let url = format!("/download/{}/{}.srt", record.provider, record.external_id);
                SubtitleEntry { record, url }
            })
            .collect(),
    }))
}
