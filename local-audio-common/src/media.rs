//! Audio file resolution
//!
//! Maps a source's relative file path to an on-disk location and a MIME type.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Audio file resolution errors, all reported to clients as "not found"
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No configured source has this id
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// The path names a parent directory or an absolute location
    #[error("Path escapes media directory: {0}")]
    OutsideMediaDir(String),

    /// No regular file at the resolved location
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Extension has no supported audio MIME type
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// An audio file ready to be streamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudio {
    pub path: PathBuf,
    pub mime_type: &'static str,
}

/// MIME type for a supported audio extension (case-insensitive)
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => Some("audio/mpeg"),
        "aac" => Some("audio/aac"),
        "m4a" => Some("audio/mp4"),
        "ogg" | "oga" | "opus" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}

/// MIME type for a path, derived from its extension
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_type_for_extension)
}

/// True if the path carries a supported audio extension
pub fn is_supported_audio(path: &Path) -> bool {
    mime_type_for_path(path).is_some()
}

/// Resolve a relative file path under a media directory
pub fn resolve_media_file(media_dir: &Path, relative: &str) -> Result<ResolvedAudio, ResolveError> {
    let relative_path = Path::new(relative);
    let escapes = relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ResolveError::OutsideMediaDir(relative.to_string()));
    }

    let path = media_dir.join(relative_path);
    if !path.is_file() {
        return Err(ResolveError::FileNotFound(path));
    }

    match mime_type_for_path(&path) {
        Some(mime_type) => Ok(ResolvedAudio { path, mime_type }),
        None => Err(ResolveError::UnsupportedFormat(path)),
    }
}

/// Relative path with `/` separators, as stored in the index
pub fn relative_file_string(media_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(media_dir).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
