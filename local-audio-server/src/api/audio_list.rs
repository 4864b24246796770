//! Audio source list lookups
//!
//! `GET /?term=<expression>&reading=<kana>&sources=a,b&user=x,y` answers with
//! the custom audio list JSON Yomichan expects. Without a query string the
//! same path reports the server version.

use axum::{
    extract::{Query, RawQuery, State},
    response::{IntoResponse, Response},
    Json,
};
use local_audio_common::db::LookupQuery;
use local_audio_common::index::AudioListing;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters of a lookup
#[derive(Debug, Default, Deserialize)]
pub struct AudioListParams {
    pub term: Option<String>,
    /// Alias of `term`
    pub expression: Option<String>,
    pub reading: Option<String>,
    /// Comma-separated source ids in priority order
    pub sources: Option<String>,
    /// Comma-separated speaker names in priority order
    pub user: Option<String>,
}

/// Lookup response
#[derive(Debug, Serialize)]
pub struct AudioSourceList {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "audioSources")]
    pub audio_sources: Vec<AudioListing>,
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

impl AudioListParams {
    /// Turn the parameters into a lookup query
    ///
    /// Sources default to every configured source in configured order.
    pub fn into_query(self, configured: &[String]) -> ApiResult<LookupQuery> {
        let expression = self
            .term
            .or(self.expression)
            .filter(|term| !term.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing term or expression".to_string()))?;

        let sources = match &self.sources {
            Some(list) => split_list(list),
            None => configured.to_vec(),
        };
        let speakers = self.user.as_deref().map(split_list).unwrap_or_default();
        let reading = self.reading.filter(|reading| !reading.is_empty());

        Ok(LookupQuery::new(expression, sources)
            .with_reading(reading)
            .with_speakers(speakers))
    }
}

/// GET /
pub async fn audio_source_list(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(params): Query<AudioListParams>,
) -> ApiResult<Response> {
    if raw.as_deref().map_or(true, str::is_empty) {
        return Ok(format!("Local Audio Server v{}", env!("CARGO_PKG_VERSION")).into_response());
    }

    let index = state.index.current().await;
    let query = params.into_query(index.source_ids())?;
    debug!("Lookup: {:?}", query);

    let audio_sources = index.lookup(&query, &state.base_url).await?;
    Ok(Json(AudioSourceList {
        kind: "audioSourceList",
        audio_sources,
    })
    .into_response())
}
