//! Variant backfill
//!
//! Copies audio between spellings known to be variants of one word. Every
//! group is planned against the index as the adapters left it and nothing
//! is inserted until all groups are planned, so audio never travels across
//! two groups through a shared member.

use crate::db::{Entry, IndexStore};
use crate::japanese::is_kana;
use crate::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Spellings sharing one reading
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionGroup {
    pub reading: String,
    pub expressions: Vec<ExpressionInfo>,
}

/// One spelling of a group, optionally with its own reading
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionInfo {
    pub kanji: String,
    #[serde(default, alias = "override_reading")]
    pub reading: Option<String>,
}

impl ExpressionGroup {
    /// `(expression, reading)` of every member, with the group reading as default
    pub fn members(&self) -> Vec<(String, String)> {
        self.expressions
            .iter()
            .map(|info| {
                let reading = info.reading.clone().unwrap_or_else(|| self.reading.clone());
                (info.kanji.clone(), reading)
            })
            .collect()
    }
}

/// What makes two rows the same recording, regardless of headword
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AudioIdentity {
    source: String,
    speaker: Option<String>,
    display: Option<String>,
    file: String,
}

impl From<&Entry> for AudioIdentity {
    fn from(entry: &Entry) -> Self {
        Self {
            source: entry.source.clone(),
            speaker: entry.speaker.clone(),
            display: entry.display.clone(),
            file: entry.file.clone(),
        }
    }
}

/// Rows to add, deduplicated across all planned groups
#[derive(Debug, Default)]
pub struct BackfillPlan {
    rows: Vec<Entry>,
    planned: HashSet<Entry>,
}

impl BackfillPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan one group given the existing rows of its searchable members
    ///
    /// `existing` must come from the index before any planned row is
    /// inserted.
    pub fn plan_group(&mut self, members: &[(String, String)], existing: &[Entry]) {
        let mut found: Vec<HashSet<AudioIdentity>> = vec![HashSet::new(); members.len()];

        for row in existing {
            for (index, (expression, reading)) in members.iter().enumerate() {
                if row.expression == *expression && row.reading.as_deref() == Some(reading.as_str()) {
                    found[index].insert(AudioIdentity::from(row));
                }
            }
        }

        for row in existing {
            let identity = AudioIdentity::from(row);
            for (index, (expression, reading)) in members.iter().enumerate() {
                if !found[index].insert(identity.clone()) {
                    continue;
                }
                let new_row = Entry {
                    expression: expression.clone(),
                    reading: Some(reading.clone()),
                    source: identity.source.clone(),
                    speaker: identity.speaker.clone(),
                    display: identity.display.clone(),
                    file: identity.file.clone(),
                };
                if self.planned.insert(new_row.clone()) {
                    self.rows.push(new_row);
                }
            }
        }
    }

    pub fn rows(&self) -> &[Entry] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Entry> {
        self.rows
    }
}

/// Plan all groups against the store, then insert the new rows
pub async fn backfill_groups(store: &IndexStore, groups: &[ExpressionGroup]) -> Result<u64> {
    let mut plan = BackfillPlan::new();

    for group in groups {
        let members = group.members();
        let mut existing = Vec::new();
        // Kana-only spellings never lend their audio to kanji spellings
        for (expression, reading) in members.iter().filter(|(expression, _)| !is_kana(expression)) {
            existing.extend(store.find_exact(expression, reading).await?);
        }
        if !existing.is_empty() {
            plan.plan_group(&members, &existing);
        }
    }

    store.insert_entries(&plan.into_rows()).await
}

/// Backfill from a variant forms file; a missing or malformed file adds nothing
pub async fn fill_variant_forms(store: &IndexStore, forms_file: &Path) -> Result<u64> {
    let bytes = match tokio::fs::read(forms_file).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No variant forms file at {}, skipping backfill", forms_file.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let groups: Vec<ExpressionGroup> = match serde_json::from_slice(&bytes) {
        Ok(groups) => groups,
        Err(e) => {
            warn!("Skipping backfill, malformed {}: {}", forms_file.display(), e);
            return Ok(0);
        }
    };

    info!("Filling variant forms from {} groups...", groups.len());
    let added = backfill_groups(store, &groups).await?;
    info!("Extra terms filled with variant forms: {}", added);
    Ok(added)
}
