//! Entry index storage
//!
//! One flat `entries` table in a SQLite file. The index is only ever written
//! by a build; afterwards it is opened read-only and queried concurrently.

mod entries;
mod query;
mod schema;

pub use entries::{Entry, IndexStatistics};
pub use query::LookupQuery;
pub use schema::recreate_entries_table;

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

/// Handle to an entry index database
#[derive(Clone)]
pub struct IndexStore {
    pool: SqlitePool,
}

impl IndexStore {
    /// Create a fresh, empty index at `db_path`, replacing any existing file
    ///
    /// Uses a single connection: builds are strictly sequential.
    pub async fn create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if db_path.exists() {
            std::fs::remove_file(db_path)?;
        }

        debug!("Creating index database: {}", db_path.display());
        // rollback journal keeps the closed database a single renameable file
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        recreate_entries_table(&pool).await?;
        info!("Created index database: {}", db_path.display());

        Ok(Self { pool })
    }

    /// Open an existing index for queries
    ///
    /// The file is never modified in place (rebuilds replace it), so many
    /// read-only connections can share it.
    pub async fn open_readonly(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(crate::Error::NotFound(format!(
                "Index database not found: {}",
                db_path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory index with the schema already created
    pub async fn in_memory() -> Result<Self> {
        // every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        recreate_entries_table(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections, waiting for them to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
