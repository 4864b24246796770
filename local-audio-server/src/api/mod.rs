//! HTTP API handlers

pub mod admin;
pub mod audio_list;
pub mod files;
pub mod health;

pub use admin::{get_stats, start_rebuild};
pub use audio_list::audio_source_list;
pub use files::{no_favicon, serve_audio_file};
pub use health::health_routes;
