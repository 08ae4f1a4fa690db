use serde::Serialize;
use std::collections::BTreeMap;

use crate::gateway::GatewayResult;
use crate::models::{CrawlResult, SearchResult};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub const fn new(kind: &'static str, message: String) -> Self {
        Self {
            error: ErrorDetail { kind, message },
        }
    }
}

/// Body of a search response: raw backend results (order preserved) or a
/// single compressed text. The `compressed`/`warning` markers appear only
/// when a requested compression pass was degraded.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResponseBody {
    Compressed {
        compressed: String,
    },
    Raw {
        results: Vec<SearchResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        compressed: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<&'static str>,
    },
}

impl From<GatewayResult<Vec<SearchResult>>> for SearchResponseBody {
    fn from(result: GatewayResult<Vec<SearchResult>>) -> Self {
        match result {
            GatewayResult::Compressed(text) => Self::Compressed { compressed: text },
            GatewayResult::Raw { payload, warning } => Self::Raw {
                results: payload,
                compressed: warning.map(|_| false),
                warning,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CrawlResponseBody {
    Compressed {
        compressed: String,
    },
    Raw {
        markdown: String,
        metadata: BTreeMap<String, String>,
        links: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        compressed: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<&'static str>,
    },
}

impl From<GatewayResult<CrawlResult>> for CrawlResponseBody {
    fn from(result: GatewayResult<CrawlResult>) -> Self {
        match result {
            GatewayResult::Compressed(text) => Self::Compressed { compressed: text },
            GatewayResult::Raw { payload, warning } => Self::Raw {
                markdown: payload.markdown,
                metadata: payload.metadata,
                links: payload.links,
                compressed: warning.map(|_| false),
                warning,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backends: HealthBackends,
}

#[derive(Debug, Serialize)]
pub struct HealthBackends {
    pub search: bool,
    pub scrape: bool,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::COMPRESSION_FAILED_WARNING;

    fn sample_results() -> Vec<SearchResult> {
        vec![SearchResult {
            title: "T".to_string(),
            url: "https://example.com".to_string(),
            snippet: "s".to_string(),
        }]
    }

    #[test]
    fn test_raw_search_body_has_no_markers() {
        let body: SearchResponseBody = GatewayResult::Raw {
            payload: sample_results(),
            warning: None,
        }
        .into();

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("results").is_some());
        assert!(json.get("compressed").is_none());
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_degraded_search_body_carries_markers() {
        let body: SearchResponseBody = GatewayResult::Raw {
            payload: sample_results(),
            warning: Some(COMPRESSION_FAILED_WARNING),
        }
        .into();

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["compressed"], serde_json::json!(false));
        assert_eq!(json["warning"], serde_json::json!("compression_failed"));
        assert_eq!(json["results"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_compressed_body_replaces_results() {
        let body: SearchResponseBody =
            GatewayResult::Compressed("condensed".to_string()).into();

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["compressed"], serde_json::json!("condensed"));
        assert!(json.get("results").is_none());
    }
}
