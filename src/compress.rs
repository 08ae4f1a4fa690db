use thiserror::Error;
use tracing::debug;

use crate::clients::{ClientError, OpenRouterClient};
use crate::models::{CrawlResult, SearchResult};

const TRUNCATION_MARKER: &str = "\n[content truncated]";

/// Compression never fails a request; the gateway downgrades this error to
/// the raw payload.
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("summarization collaborator unavailable: {0}")]
    Unavailable(String),
}

impl From<ClientError> for CompressionError {
    fn from(err: ClientError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Turns a result payload into condensed text by handing a bounded textual
/// rendering plus the caller's instruction to the summarization collaborator.
pub struct Compressor {
    client: OpenRouterClient,
    system_prompt: String,
    max_payload_chars: usize,
}

impl Compressor {
    #[must_use]
    pub fn new(
        client: OpenRouterClient,
        system_prompt: impl Into<String>,
        max_payload_chars: usize,
    ) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            max_payload_chars,
        }
    }

    pub async fn compress_search(
        &self,
        instruction: &str,
        results: &[SearchResult],
    ) -> Result<String, CompressionError> {
        let payload = render_search_results(results);
        self.compress(instruction, payload).await
    }

    pub async fn compress_crawl(
        &self,
        instruction: &str,
        result: &CrawlResult,
    ) -> Result<String, CompressionError> {
        let payload = render_crawl_result(result);
        self.compress(instruction, payload).await
    }

    async fn compress(
        &self,
        instruction: &str,
        payload: String,
    ) -> Result<String, CompressionError> {
        let payload = truncate_chars(payload, self.max_payload_chars);

        debug!(
            payload_chars = payload.chars().count(),
            "Compressing payload"
        );

        let user = format!("Instruction: {instruction}\n\nContent:\n{payload}");
        let text = self.client.complete(&self.system_prompt, &user).await?;
        Ok(text)
    }
}

fn render_search_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.url,
            result.snippet
        ));
    }
    out
}

fn render_crawl_result(result: &CrawlResult) -> String {
    let mut out = String::new();
    for (key, value) in &result.metadata {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out.push('\n');
    out.push_str(&result.markdown);
    out
}

/// Deterministic char-budget truncation, cutting on a char boundary.
fn truncate_chars(text: String, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => {
            let mut truncated = text[..byte_index].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_truncate_is_deterministic_and_bounded() {
        let text = "a".repeat(100);
        let first = truncate_chars(text.clone(), 10);
        let second = truncate_chars(text, 10);

        assert_eq!(first, second);
        assert!(first.starts_with("aaaaaaaaaa"));
        assert!(first.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_keeps_short_text_intact() {
        let text = "short".to_string();
        assert_eq!(truncate_chars(text, 100), "short");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld".repeat(10);
        let truncated = truncate_chars(text, 15);
        // Must not panic on a multi-byte boundary and must stay within budget.
        assert_eq!(
            truncated.chars().count(),
            15 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_render_search_results_numbers_entries() {
        let results = vec![
            SearchResult {
                title: "First".to_string(),
                url: "https://a.example".to_string(),
                snippet: "alpha".to_string(),
            },
            SearchResult {
                title: "Second".to_string(),
                url: "https://b.example".to_string(),
                snippet: "beta".to_string(),
            },
        ];

        let rendered = render_search_results(&results);
        assert!(rendered.contains("1. First"));
        assert!(rendered.contains("2. Second"));
        assert!(rendered.find("First").unwrap() < rendered.find("Second").unwrap());
    }

    #[test]
    fn test_render_crawl_result_leads_with_metadata() {
        let result = CrawlResult {
            markdown: "# Body".to_string(),
            metadata: BTreeMap::from([("title".to_string(), "Page".to_string())]),
            links: vec![],
        };

        let rendered = render_crawl_result(&result);
        assert!(rendered.starts_with("title: Page\n"));
        assert!(rendered.ends_with("# Body"));
    }
}
