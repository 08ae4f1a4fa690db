use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ClientError;
use crate::models::{CrawlRequest, CrawlResult};

const SERVICE: &str = "scrape backend";

#[derive(Debug, Serialize)]
struct CrawlPayload<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    css_selector: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for: Option<&'a str>,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    markdown: String,
    #[serde(default)]
    metadata: serde_json::Map<String, Value>,
    #[serde(default)]
    links: Vec<Value>,
}

/// Client for the render-and-extract scraping backend.
#[derive(Clone)]
pub struct CrawlClient {
    client: Client,
    base_url: String,
}

impl CrawlClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Issues one render-and-extract call. The request's `timeout` bounds the
    /// whole call; exceeding it surfaces as [`ClientError::Timeout`].
    pub async fn fetch(&self, request: &CrawlRequest) -> Result<CrawlResult, ClientError> {
        let url = format!("{}/crawl", self.base_url.trim_end_matches('/'));
        let payload = CrawlPayload {
            url: request.url.as_str(),
            css_selector: request.css_selector.as_deref(),
            wait_for: request.wait_for.as_deref(),
            timeout: request.timeout,
        };

        debug!("Fetching page via scrape backend: {}", request.url);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(request.timeout))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::bad_status(SERVICE, status, body));
        }

        let body: CrawlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::from_reqwest(SERVICE, e))?;

        Ok(map_response(body))
    }

    /// Liveness probe against the backend's health endpoint.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn map_response(raw: CrawlResponse) -> CrawlResult {
    CrawlResult {
        markdown: raw.markdown,
        metadata: raw
            .metadata
            .into_iter()
            .filter_map(|(key, value)| stringify(value).map(|v| (key, v)))
            .collect::<BTreeMap<_, _>>(),
        links: raw.links.into_iter().filter_map(flatten_link).collect(),
    }
}

/// The backend emits links either as plain strings or as objects carrying the
/// target under one of several keys.
fn flatten_link(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => ["href", "url", "link", "src"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    }
}

fn stringify(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(stringify)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_response_flattens_link_objects() {
        let json = r#"{
            "markdown": "# Title",
            "metadata": {"title": "Title", "language": "en"},
            "links": [
                "https://plain.example",
                {"href": "https://href.example"},
                {"url": "https://url.example"},
                {"unrelated": true},
                42
            ]
        }"#;

        let raw: CrawlResponse = serde_json::from_str(json).unwrap();
        let result = map_response(raw);

        assert_eq!(
            result.links,
            vec![
                "https://plain.example",
                "https://href.example",
                "https://url.example",
            ]
        );
    }

    #[test]
    fn test_map_response_stringifies_metadata() {
        let json = r#"{
            "markdown": "",
            "metadata": {
                "title": "Page",
                "keywords": ["a", "b"],
                "description": null,
                "word_count": 120
            },
            "links": []
        }"#;

        let raw: CrawlResponse = serde_json::from_str(json).unwrap();
        let result = map_response(raw);

        assert_eq!(result.metadata.get("title"), Some(&"Page".to_string()));
        assert_eq!(result.metadata.get("keywords"), Some(&"a, b".to_string()));
        assert_eq!(result.metadata.get("word_count"), Some(&"120".to_string()));
        assert!(!result.metadata.contains_key("description"));
    }

    #[test]
    fn test_map_response_tolerates_missing_fields() {
        let raw: CrawlResponse = serde_json::from_str("{}").unwrap();
        let result = map_response(raw);

        assert!(result.markdown.is_empty());
        assert!(result.metadata.is_empty());
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_payload_omits_absent_options() {
        let payload = CrawlPayload {
            url: "https://example.com/",
            css_selector: None,
            wait_for: None,
            timeout: 30,
        };
        let json = serde_json::to_string(&payload).unwrap();

        assert!(!json.contains("css_selector"));
        assert!(!json.contains("wait_for"));
        assert!(json.contains("\"timeout\":30"));
    }
}
