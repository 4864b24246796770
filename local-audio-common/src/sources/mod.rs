//! Source adapters
//!
//! Each configured corpus has one [`SourceKind`] deciding how its files are
//! turned into [`Entry`] rows. Adapters never fail a build: a missing or
//! malformed corpus is logged and contributes no rows.

mod ajt_jp;
mod forvo;
mod jpod;
mod json;
mod nhk16;
mod ozk5;
mod scan;

pub use ajt_jp::ajt_display_text;
pub use jpod::{parse_file_stem, NAME_DELIMITER};
pub use json::NumberOrText;
pub use nhk16::{kanji_numeral, numeral_prefixes};

use crate::db::{Entry, IndexStore};
use crate::media::{resolve_media_file, ResolveError, ResolvedAudio};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Corpus formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `reading - expression.ext` phrase packs walked from a directory tree
    Jpod,
    /// `speaker/expression.ext` recording sets
    Forvo,
    /// Pitch accent dictionary described by `entries.json`
    Nhk,
    /// Vendor export indexed by `index.json` headword and file maps
    AjtJp,
    /// Dictionary export indexed by `index.json` entry list
    Ozk5,
}

/// Errors reading one corpus; always recovered by skipping the corpus
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Media directory not found: {0}")]
    MissingMediaDir(PathBuf),

    #[error("Index file not found: {0}")]
    MissingIndex(PathBuf),

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration of one corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Stable id: the `source` column, URL path segment and priority key
    pub id: String,
    /// Absolute media root
    pub media_dir: PathBuf,
    /// Display name template; `%s` is replaced by the row's display text
    pub display: String,
}

/// A configured corpus and its adapter
#[derive(Debug, Clone)]
pub struct AudioSource {
    kind: SourceKind,
    descriptor: SourceDescriptor,
}

impl AudioSource {
    pub fn new(kind: SourceKind, descriptor: SourceDescriptor) -> Self {
        Self { kind, descriptor }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    /// Read the corpus into normalized rows without touching the index
    pub fn collect_entries(&self) -> Result<Vec<Entry>, SourceError> {
        match self.kind {
            SourceKind::Jpod => jpod::collect_entries(&self.descriptor),
            SourceKind::Forvo => forvo::collect_entries(&self.descriptor),
            SourceKind::Nhk => nhk16::collect_entries(&self.descriptor),
            SourceKind::AjtJp => ajt_jp::collect_entries(&self.descriptor),
            SourceKind::Ozk5 => ozk5::collect_entries(&self.descriptor),
        }
    }

    /// Add this corpus' rows to the index, returning the number inserted
    ///
    /// Corpus errors are logged and yield zero rows; only database errors
    /// are returned.
    pub async fn add_entries(&self, store: &IndexStore) -> crate::Result<u64> {
        let source = self.clone();
        let collected = tokio::task::spawn_blocking(move || source.collect_entries())
            .await
            .map_err(|e| crate::Error::Internal(format!("Source scan task failed: {}", e)))?;

        let entries = match collected {
            Ok(entries) => entries,
            Err(e) => {
                warn!("({}) Skipping source: {}", self.id(), e);
                return Ok(0);
            }
        };

        let inserted = store.insert_entries(&entries).await?;
        info!("({}) Added {} entries", self.id(), inserted);
        Ok(inserted)
    }

    /// Human-readable name for one of this source's rows
    pub fn display_name(&self, display: Option<&str>) -> String {
        match display {
            Some(text) => self.descriptor.display.replace("%s", text),
            None => self.descriptor.display.clone(),
        }
    }

    /// Locate one of this source's files on disk
    pub fn resolve_file(&self, relative: &str) -> Result<ResolvedAudio, ResolveError> {
        resolve_media_file(&self.descriptor.media_dir, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn source(display: &str) -> AudioSource {
        AudioSource::new(
            SourceKind::Nhk,
            SourceDescriptor {
                id: "nhk16".into(),
                media_dir: Path::new("/nonexistent/nhk16").to_path_buf(),
                display: display.into(),
            },
        )
    }

    #[test]
    fn test_display_name_substitution() {
        let source = source("NHK16 %s");
        assert_eq!(source.display_name(Some("ヨ＼ム [1]")), "NHK16 ヨ＼ム [1]");
        assert_eq!(source.display_name(None), "NHK16 %s");
    }

    #[test]
    fn test_display_name_without_placeholder() {
        let source = source("JPod101");
        assert_eq!(source.display_name(Some("ignored")), "JPod101");
    }

    #[tokio::test]
    async fn test_missing_corpus_adds_nothing() {
        let store = IndexStore::in_memory().await.unwrap();
        let inserted = source("NHK16 %s").add_entries(&store).await.unwrap();
        assert_eq!(inserted, 0);
        assert!(!store.has_data().await.unwrap());
    }

    #[test]
    fn test_kind_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: SourceKind,
        }
        let parse = |name: &str| {
            toml::from_str::<Wrapper>(&format!("kind = \"{}\"", name))
                .unwrap()
                .kind
        };
        assert_eq!(parse("jpod"), SourceKind::Jpod);
        assert_eq!(parse("forvo"), SourceKind::Forvo);
        assert_eq!(parse("nhk"), SourceKind::Nhk);
        assert_eq!(parse("ajt_jp"), SourceKind::AjtJp);
        assert_eq!(parse("ozk5"), SourceKind::Ozk5);
    }
}
