use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::models::SearchQuery;

use super::{ApiError, AppState, types::SearchResponseBody, validation};

/// Raw query parameters. Everything arrives as an optional string so that
/// every malformed value is rejected with the gateway's own error shape
/// instead of the framework's.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub format: Option<String>,
    pub pageno: Option<String>,
    pub categories: Option<String>,
    pub time_range: Option<String>,
    pub compress: Option<String>,
    pub instruction: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponseBody>, ApiError> {
    let text = validation::validate_query_text(params.q.as_deref())?;
    validation::validate_format(params.format.as_deref())?;

    let query = SearchQuery {
        text,
        page: validation::parse_page(params.pageno.as_deref())?,
        categories: validation::parse_categories(params.categories.as_deref())?,
        time_range: validation::parse_time_range(params.time_range.as_deref())?,
    };

    let compress = validation::parse_bool(params.compress.as_deref(), "compress")?;
    let instruction = validation::validate_instruction(compress, params.instruction.as_deref())?;

    info!(
        query = %query.text,
        page = query.page,
        compress,
        "Search request"
    );

    let result = state.gateway.search(&query, instruction.as_deref()).await?;

    Ok(Json(result.into()))
}
