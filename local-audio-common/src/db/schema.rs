//! Entry table schema

use crate::Result;
use sqlx::SqlitePool;

/// Drop and recreate the `entries` table and its indices
///
/// Columns:
/// - `expression`: the lookup headword, possibly in kanji
/// - `reading`: kana pronunciation; NULL when the source has none, which
///   matches any requested reading
/// - `source`: id of the configured source that produced the row
/// - `speaker`: recording artist, only for speaker-tagged sources
/// - `display`: pre-rendered pitch accent or speaker text
/// - `file`: path relative to the source's media directory
pub async fn recreate_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS entries")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE entries (
            id INTEGER PRIMARY KEY NOT NULL,
            expression TEXT NOT NULL,
            reading TEXT,
            source TEXT NOT NULL,
            speaker TEXT,
            display TEXT,
            file TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One index per side of the OR predicates, plus the two lookup shapes
    for statement in [
        "CREATE INDEX idx_reading ON entries(reading)",
        "CREATE INDEX idx_speaker ON entries(speaker)",
        "CREATE INDEX idx_expr_reading ON entries(expression, reading)",
        "CREATE INDEX idx_expr_reading_source ON entries(expression, reading, source)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
