//! local-audio-server library - HTTP boundary of the local audio index
//!
//! Serves Yomichan-compatible audio source lists, the audio files they
//! point to, and a small admin API for statistics and rebuilds.

use axum::Router;
use local_audio_common::config::DataPaths;
use local_audio_common::SharedIndex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The index lookups run against; swapped by rebuilds
    pub index: SharedIndex,
    /// Index file locations, needed to rebuild
    pub paths: DataPaths,
    /// `http://host:port` prefix of audio file URLs
    pub base_url: String,
}

impl AppState {
    pub fn new(index: SharedIndex, paths: DataPaths, base_url: impl Into<String>) -> Self {
        Self {
            index,
            paths,
            base_url: base_url.into(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let admin = Router::new()
        .route("/api/stats", get(api::get_stats))
        .route("/api/rebuild", post(api::start_rebuild));

    Router::new()
        .route("/", get(api::audio_source_list))
        .route("/favicon.ico", get(api::no_favicon))
        .route("/:source/*path", get(api::serve_audio_file))
        .merge(admin)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
