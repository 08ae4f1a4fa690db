use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::ClientError;
use crate::models::{SearchQuery, SearchResult};

const SERVICE: &str = "search backend";

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    url: String,
    /// The snippet field; SearxNG calls it `content`.
    #[serde(default)]
    content: String,
}

/// Client for a SearxNG-compatible meta-search backend.
#[derive(Clone)]
pub struct SearxClient {
    client: Client,
    base_url: String,
}

impl SearxClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Issues one search call; result order is the backend's relevance order
    /// and is preserved as-is.
    pub async fn query(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ClientError> {
        let url = self.build_url(query)?;

        debug!("Querying search backend: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::bad_status(SERVICE, status, body));
        }

        let body: SearxResponse = response
            .json()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        Ok(body.results.into_iter().map(map_result).collect())
    }

    /// Liveness probe against the backend's health endpoint.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/healthz", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn build_url(&self, query: &SearchQuery) -> Result<Url, ClientError> {
        let base = format!("{}/search", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base).map_err(|e| ClientError::Unavailable {
            service: SERVICE,
            status: None,
            message: format!("invalid base url: {e}"),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.text);
            pairs.append_pair("format", "json");
            pairs.append_pair("pageno", &query.page.to_string());

            if !query.categories.is_empty() {
                let csv = query
                    .categories
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.append_pair("categories", &csv);
            }

            if let Some(range) = query.time_range {
                pairs.append_pair("time_range", range.as_str());
            }
        }

        Ok(url)
    }
}

fn map_result(raw: SearxResult) -> SearchResult {
    SearchResult {
        title: raw.title,
        url: raw.url,
        snippet: raw.content,
    }
}
