//! Priority-ordered lookup queries
//!
//! Queries are assembled with [`sqlx::QueryBuilder`]: every caller-supplied
//! value is a bound parameter, and the only text pushed into the SQL is
//! fixed column names and rank literals.

use super::{Entry, IndexStore};
use crate::Result;
use sqlx::{QueryBuilder, Sqlite};

const SELECT_ENTRIES: &str =
    "SELECT expression, reading, source, speaker, display, file FROM entries WHERE expression = ";

/// A lookup by headword with source/speaker priority lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub expression: String,
    /// None skips the reading predicate entirely
    pub reading: Option<String>,
    /// Acceptable sources, most preferred first
    pub sources: Vec<String>,
    /// Acceptable speakers, most preferred first; empty means no filter
    pub speakers: Vec<String>,
}

impl LookupQuery {
    pub fn new(expression: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            expression: expression.into(),
            reading: None,
            sources,
            speakers: Vec::new(),
        }
    }

    pub fn with_reading(mut self, reading: Option<String>) -> Self {
        self.reading = reading;
        self
    }

    pub fn with_speakers(mut self, speakers: Vec<String>) -> Self {
        self.speakers = speakers;
        self
    }

    /// The source filter is only needed when some configured source is not
    /// requested; the ranking expression still orders by the given list.
    fn filters_sources(&self, configured: &[String]) -> bool {
        !configured.iter().all(|id| self.sources.contains(id))
    }

    /// Build the parameterized query
    ///
    /// `configured` is the id list of every configured source.
    pub fn build(&self, configured: &[String]) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(SELECT_ENTRIES);
        builder.push_bind(self.expression.clone());

        if let Some(reading) = &self.reading {
            // a row without a reading matches any requested reading
            builder.push(" AND (reading IS NULL OR reading = ");
            builder.push_bind(reading.clone());
            builder.push(")");
        }

        if self.filters_sources(configured) {
            builder.push(" AND source IN (");
            push_bound_list(&mut builder, &self.sources);
            builder.push(")");
        }

        if !self.speakers.is_empty() {
            builder.push(" AND (speaker IS NULL OR speaker IN (");
            push_bound_list(&mut builder, &self.speakers);
            builder.push("))");
        }

        builder.push(" ORDER BY ");
        push_rank(&mut builder, "source", &self.sources);
        if !self.speakers.is_empty() {
            builder.push(", ");
            push_rank(&mut builder, "speaker", &self.speakers);
        }
        // rows with an actual reading before reading-agnostic ones
        builder.push(", reading IS NULL, reading, id");

        builder
    }
}

fn push_bound_list(builder: &mut QueryBuilder<'static, Sqlite>, values: &[String]) {
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value.clone());
    }
}

/// `(CASE <column> WHEN ? THEN 0 WHEN ? THEN 1 ... END)`: ranks a row by the
/// position of its value in the caller's list
fn push_rank(builder: &mut QueryBuilder<'static, Sqlite>, column: &'static str, values: &[String]) {
    builder.push("(CASE ");
    builder.push(column);
    for (rank, value) in values.iter().enumerate() {
        builder.push(" WHEN ");
        builder.push_bind(value.clone());
        builder.push(" THEN ");
        builder.push(rank);
    }
    builder.push(" END)");
}

impl IndexStore {
    /// Execute a lookup, returning rows in priority order
    pub async fn lookup(&self, query: &LookupQuery, configured: &[String]) -> Result<Vec<Entry>> {
        if query.sources.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = query.build(configured);
        let rows = builder
            .build_query_as::<Entry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
