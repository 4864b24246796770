//! Index statistics and rebuild endpoints

use axum::{extract::State, http::StatusCode, Json};
use local_audio_common::db::IndexStatistics;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<IndexStatistics>> {
    let statistics = state.index.current().await.statistics().await?;
    Ok(Json(statistics))
}

/// POST /api/rebuild
///
/// Starts a rebuild in the background. Lookups keep using the current
/// index until the rebuilt one is swapped in. Only one rebuild runs at a
/// time.
pub async fn start_rebuild(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Value>)> {
    let guard = state
        .index
        .try_begin_rebuild()
        .ok_or_else(|| ApiError::Conflict("A rebuild is already running".to_string()))?;

    info!("Rebuild requested");
    let index = state.index.clone();
    let paths = state.paths.clone();
    tokio::spawn(async move {
        match index.rebuild(&paths, &guard).await {
            Ok(report) => info!("Rebuild complete: {} entries", report.total()),
            Err(e) => error!("Rebuild failed: {}", e),
        }
    });

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "rebuilding" }))))
}
