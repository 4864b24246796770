//! Audio file serving

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /:source/*path
///
/// Streams a source's audio file with its MIME type. Unknown sources,
/// missing files, unsupported formats and paths leaving the media
/// directory are all 404.
pub async fn serve_audio_file(
    State(state): State<AppState>,
    Path((source, path)): Path<(String, String)>,
) -> ApiResult<Response> {
    let resolved = state.index.current().await.resolve_file(&source, &path)?;
    debug!("Serving {} as {}", resolved.path.display(), resolved.mime_type);

    let bytes = match tokio::fs::read(&resolved.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(resolved.path.display().to_string()));
        }
        Err(e) => return Err(ApiError::Internal(format!("Cannot read audio file: {}", e))),
    };

    Ok(([(header::CONTENT_TYPE, resolved.mime_type)], bytes).into_response())
}

/// GET /favicon.ico
pub async fn no_favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}
