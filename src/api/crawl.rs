use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::models::CrawlRequest;

use super::{ApiError, AppState, types::CrawlResponseBody, validation};

#[derive(Debug, Deserialize)]
pub struct CrawlBody {
    pub url: String,
    pub css_selector: Option<String>,
    pub wait_for: Option<String>,
    /// Seconds; bounds the scrape call.
    pub timeout: Option<u64>,
    #[serde(default)]
    pub compress: bool,
    pub instruction: Option<String>,
}

pub async fn crawl(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrawlBody>,
) -> Result<Json<CrawlResponseBody>, ApiError> {
    let url = validation::validate_url(&body.url)?;
    let timeout = validation::validate_crawl_timeout(
        body.timeout,
        state.config.scrape.default_timeout_seconds,
    )?;
    let instruction = validation::validate_instruction(body.compress, body.instruction.as_deref())?;

    let request = CrawlRequest {
        url,
        css_selector: body.css_selector,
        wait_for: body.wait_for,
        timeout,
    };

    info!(url = %request.url, timeout, compress = body.compress, "Crawl request");

    let result = state
        .gateway
        .crawl(&request, instruction.as_deref())
        .await?;

    Ok(Json(result.into()))
}
