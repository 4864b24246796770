//! Entry rows: bulk insert, exact lookup and statistics

use super::IndexStore;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;

const INSERT_ENTRY_SQL: &str = "INSERT INTO entries (expression, reading, source, speaker, display, file) VALUES (?, ?, ?, ?, ?, ?)";

/// The atomic indexed fact: one audio file for one headword
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct Entry {
    pub expression: String,
    pub reading: Option<String>,
    pub source: String,
    pub speaker: Option<String>,
    pub display: Option<String>,
    pub file: String,
}

impl Entry {
    pub fn new(
        expression: impl Into<String>,
        reading: Option<String>,
        source: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            reading,
            source: source.into(),
            speaker: None,
            display: None,
            file: file.into(),
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_display(mut self, display: Option<String>) -> Self {
        self.display = display;
        self
    }
}

/// Row counts of a built index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStatistics {
    pub total_entries: i64,
    pub unique_expressions: i64,
    pub entries_per_source: BTreeMap<String, i64>,
}

impl IndexStore {
    /// Insert all entries in a single transaction, returning the row count
    pub async fn insert_entries(&self, entries: &[Entry]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for entry in entries {
            let result = sqlx::query(INSERT_ENTRY_SQL)
                .bind(&entry.expression)
                .bind(&entry.reading)
                .bind(&entry.source)
                .bind(&entry.speaker)
                .bind(&entry.display)
                .bind(&entry.file)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Rows whose expression and reading both match exactly
    ///
    /// Unlike [`IndexStore::lookup`], a NULL reading does not match.
    pub async fn find_exact(&self, expression: &str, reading: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, Entry>(
            r#"
            SELECT expression, reading, source, speaker, display, file
            FROM entries
            WHERE expression = ? AND reading = ?
            ORDER BY id
            "#,
        )
        .bind(expression)
        .bind(reading)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// True if the `entries` table exists and holds at least one row
    pub async fn has_data(&self) -> Result<bool> {
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'entries'",
        )
        .fetch_one(&self.pool)
        .await?;
        if tables == 0 {
            return Ok(false);
        }

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(rows > 0)
    }

    /// Totals, distinct headwords and per-source counts
    pub async fn statistics(&self) -> Result<IndexStatistics> {
        let total_entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;

        let unique_expressions: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT expression) FROM entries")
                .fetch_one(&self.pool)
                .await?;

        let per_source: Vec<(String, i64)> =
            sqlx::query_as("SELECT source, COUNT(*) FROM entries GROUP BY source")
                .fetch_all(&self.pool)
                .await?;

        Ok(IndexStatistics {
            total_entries,
            unique_expressions,
            entries_per_source: per_source.into_iter().collect(),
        })
    }
}
