//! Subtitle download proxy endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use subtonic_core::RetrievalError;
use tracing::info;

use crate::state::AppState;

/// GET /download/{provider}/{file}
///
/// The file segment is the provider's external id, optionally suffixed with
/// `.srt`. The response body is always normalized SubRip text.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((provider, file)): Path<(String, String)>,
) -> Response {
    let external_id = file.strip_suffix(".srt").unwrap_or(&file);

    match state.proxy().fetch(&provider, external_id).await {
        Ok(subtitle) => {
            info!(provider = %provider, id = %external_id, bytes = subtitle.text.len(), "Serving subtitle");
            (
                [(
                    header::CONTENT_TYPE,
                    format!("{}; charset=utf-8", subtitle.content_type),
                )],
                subtitle.text,
            )
                .into_response()
        }
        Err(e) => {
            let status = match &e {
                RetrievalError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                RetrievalError::UnknownProvider(_) => StatusCode::NOT_FOUND,
                RetrievalError::ArtifactNotFound => StatusCode::NOT_FOUND,
                RetrievalError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            };
            (status, e.to_string()).into_response()
        }
    }
}
