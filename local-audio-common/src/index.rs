//! Audio index lifecycle
//!
//! An [`AudioIndex`] pairs a read-only [`IndexStore`] with the sources it was
//! built from. Builds always write a fresh database file next to the live
//! one and rename it into place; [`SharedIndex`] then swaps the new index in
//! while queries already running finish on the old one.

use crate::backfill::fill_variant_forms;
use crate::config::DataPaths;
use crate::db::{IndexStatistics, IndexStore, LookupQuery};
use crate::media::{ResolveError, ResolvedAudio};
use crate::sources::AudioSource;
use crate::version::{marker_requires_rebuild, write_version_marker, Version};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{info, warn};

/// One playable result: display name and file URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioListing {
    pub name: String,
    pub url: String,
}

/// Row counts of a finished build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub entries_per_source: BTreeMap<String, u64>,
    pub backfilled: u64,
}

impl BuildReport {
    pub fn total(&self) -> u64 {
        self.entries_per_source.values().sum::<u64>() + self.backfilled
    }
}

/// URL of a source file, with each path segment percent-encoded
pub fn audio_url(base_url: &str, source_id: &str, file: &str) -> String {
    let mut url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(source_id)
    );
    for segment in file.split('/') {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

/// A built index and the sources it serves
pub struct AudioIndex {
    store: IndexStore,
    sources: Vec<AudioSource>,
    source_ids: Vec<String>,
}

impl AudioIndex {
    pub fn new(store: IndexStore, sources: Vec<AudioSource>) -> Self {
        let source_ids = sources.iter().map(|s| s.id().to_string()).collect();
        Self {
            store,
            sources,
            source_ids,
        }
    }

    /// Open the live index database read-only
    pub async fn open(paths: &DataPaths, sources: Vec<AudioSource>) -> Result<Self> {
        let store = IndexStore::open_readonly(&paths.entries_db()).await?;
        Ok(Self::new(store, sources))
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Sources in default priority order
    pub fn sources(&self) -> &[AudioSource] {
        &self.sources
    }

    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    pub fn source(&self, id: &str) -> Option<&AudioSource> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Run a lookup and name each row by its source's display template
    ///
    /// Rows from sources no longer configured are skipped.
    pub async fn lookup(&self, query: &LookupQuery, base_url: &str) -> Result<Vec<AudioListing>> {
        let rows = self.store.lookup(query, &self.source_ids).await?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(source) = self.source(&row.source) else {
                warn!("Skipping entry from unknown source: {}", row.source);
                continue;
            };
            listings.push(AudioListing {
                name: source.display_name(row.display.as_deref()),
                url: audio_url(base_url, source.id(), &row.file),
            });
        }

        Ok(listings)
    }

    /// Locate a source's audio file on disk
    pub fn resolve_file(&self, source_id: &str, relative: &str) -> std::result::Result<ResolvedAudio, ResolveError> {
        self.source(source_id)
            .ok_or_else(|| ResolveError::UnknownSource(source_id.to_string()))?
            .resolve_file(relative)
    }

    pub async fn statistics(&self) -> Result<IndexStatistics> {
        self.store.statistics().await
    }
}

/// Build a new index database and move it over the live one
///
/// Sources are added in order, then the variant backfill runs. The version
/// marker is written only once the new database is in place.
///
/// The rename relies on Unix semantics: pools still reading the replaced
/// file keep it open. Windows refuses to rename over a file another pool
/// holds open, so rebuilding under a live server fails there and the live
/// index is left untouched.
pub async fn build_index(paths: &DataPaths, sources: &[AudioSource]) -> Result<BuildReport> {
    info!("Building audio index. This may take a while...");
    let building = paths.building_db();
    let store = IndexStore::create(&building).await?;
    let mut report = BuildReport::default();

    for source in sources {
        info!("Adding entries from {}...", source.id());
        let added = source.add_entries(&store).await?;
        report.entries_per_source.insert(source.id().to_string(), added);
    }

    report.backfilled = fill_variant_forms(&store, &paths.variant_forms()).await?;
    store.close().await;

    tokio::fs::rename(&building, paths.entries_db()).await?;
    write_version_marker(&paths.version_marker(), Version::current())?;

    info!("Audio index built with {} entries", report.total());
    Ok(report)
}

/// True if the live index is missing, unreadable, empty or built by an
/// outdated version
pub async fn needs_rebuild(paths: &DataPaths) -> Result<bool> {
    let store = match IndexStore::open_readonly(&paths.entries_db()).await {
        Ok(store) => store,
        Err(Error::NotFound(_)) => {
            info!("No audio index at {}", paths.entries_db().display());
            return Ok(true);
        }
        Err(Error::Database(e)) => {
            warn!("Audio index {} is unreadable, rebuilding: {}", paths.entries_db().display(), e);
            return Ok(true);
        }
        Err(e) => return Err(e),
    };

    let has_data = store.has_data().await;
    store.close().await;

    match has_data {
        Ok(true) => {}
        Ok(false) => {
            info!("Audio index is empty");
            return Ok(true);
        }
        Err(Error::Database(e)) => {
            warn!("Audio index {} is unreadable, rebuilding: {}", paths.entries_db().display(), e);
            return Ok(true);
        }
        Err(e) => return Err(e),
    }

    Ok(marker_requires_rebuild(&paths.version_marker()))
}

/// Open the live index, building it first if needed
pub async fn attempt_init(paths: &DataPaths, sources: Vec<AudioSource>) -> Result<AudioIndex> {
    if needs_rebuild(paths).await? {
        build_index(paths, &sources).await?;
    }
    AudioIndex::open(paths, sources).await
}

/// The index queries currently run against, replaceable by a rebuild
#[derive(Clone)]
pub struct SharedIndex {
    current: Arc<RwLock<Arc<AudioIndex>>>,
    rebuild_lock: Arc<Mutex<()>>,
}

impl SharedIndex {
    pub fn new(index: AudioIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot of the current index; stays valid across a swap
    pub async fn current(&self) -> Arc<AudioIndex> {
        self.current.read().await.clone()
    }

    /// Install a new index, returning the previous one
    pub async fn replace(&self, index: AudioIndex) -> Arc<AudioIndex> {
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, Arc::new(index))
    }

    /// Claim the right to rebuild; None while another rebuild runs
    pub fn try_begin_rebuild(&self) -> Option<OwnedMutexGuard<()>> {
        self.rebuild_lock.clone().try_lock_owned().ok()
    }

    /// Rebuild from the current sources and swap the result in
    ///
    /// The caller must hold the guard from [`SharedIndex::try_begin_rebuild`].
    pub async fn rebuild(&self, paths: &DataPaths, _guard: &OwnedMutexGuard<()>) -> Result<BuildReport> {
        let sources = self.current().await.sources().to_vec();
        let report = build_index(paths, &sources).await?;
        let index = AudioIndex::open(paths, sources).await?;
        self.replace(index).await;
        info!("Swapped in rebuilt audio index");
        Ok(report)
    }
}
