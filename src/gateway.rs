use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::clients::{self, ClientError, CrawlClient, OpenRouterClient, SearxClient};
use crate::compress::Compressor;
use crate::config::Config;
use crate::models::{CrawlRequest, CrawlResult, SearchQuery, SearchResult};

/// Marker attached to a raw response when a requested compression pass
/// failed and the gateway fell back to the uncompressed payload.
pub const COMPRESSION_FAILED_WARNING: &str = "compression_failed";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Outcome of a gateway operation: the raw backend payload XOR a single
/// compressed text, never both.
#[derive(Debug)]
pub enum GatewayResult<T> {
    Raw {
        payload: T,
        warning: Option<&'static str>,
    },
    Compressed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct BackendHealth {
    pub search: bool,
    pub scrape: bool,
}

impl BackendHealth {
    #[must_use]
    pub const fn all_ok(self) -> bool {
        self.search && self.scrape
    }
}

/// The aggregation core: fixed two-way dispatch over the search and scrape
/// backends, an optional response cache in front of each, and a best-effort
/// compression pass behind both.
pub struct Gateway {
    searx: SearxClient,
    crawler: CrawlClient,
    compressor: Compressor,
    search_cache: Option<TtlCache<Vec<SearchResult>>>,
    crawl_cache: Option<TtlCache<CrawlResult>>,
}

impl Gateway {
    /// Caches are passed in explicitly (`None` disables them) so callers and
    /// tests control the only cross-request state the gateway holds.
    #[must_use]
    pub fn new(
        searx: SearxClient,
        crawler: CrawlClient,
        compressor: Compressor,
        search_cache: Option<TtlCache<Vec<SearchResult>>>,
        crawl_cache: Option<TtlCache<CrawlResult>>,
    ) -> Self {
        Self {
            searx,
            crawler,
            compressor,
            search_cache,
            crawl_cache,
        }
    }

    /// Builds the gateway and its backend clients from config, sharing one
    /// HTTP connection pool across all of them.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = clients::build_http_client(config.search.request_timeout_seconds)?;

        let searx = SearxClient::new(http.clone(), config.search.base_url.clone());
        let crawler = CrawlClient::new(http.clone(), config.scrape.base_url.clone());

        let openrouter = OpenRouterClient::new(
            http,
            config.compression.base_url.clone(),
            config.compression.api_key.clone(),
            config.compression.model.clone(),
            Duration::from_secs(config.compression.request_timeout_seconds),
        );
        let compressor = Compressor::new(
            openrouter,
            config.compression.system_prompt.clone(),
            config.compression.max_payload_chars,
        );

        let (search_cache, crawl_cache) = if config.cache.enabled {
            (
                Some(TtlCache::new(
                    Duration::from_secs(config.cache.search_ttl_seconds),
                    config.cache.max_entries,
                )),
                Some(TtlCache::new(
                    Duration::from_secs(config.cache.crawl_ttl_seconds),
                    config.cache.max_entries,
                )),
            )
        } else {
            (None, None)
        };

        Ok(Self::new(
            searx,
            crawler,
            compressor,
            search_cache,
            crawl_cache,
        ))
    }

    /// One search round-trip, optionally compressed. `instruction` being
    /// `Some` means compression was requested; compression failures degrade
    /// to the raw result with a warning instead of failing the request.
    pub async fn search(
        &self,
        query: &SearchQuery,
        instruction: Option<&str>,
    ) -> Result<GatewayResult<Vec<SearchResult>>, GatewayError> {
        check_instruction(instruction)?;

        let key = search_cache_key(query);
        let results = match self.search_cache.as_ref().and_then(|c| c.get(&key)) {
            Some(cached) => {
                debug!("Search cache hit: {}", key);
                cached
            }
            None => {
                let results = self.searx.query(query).await?;
                if let Some(cache) = &self.search_cache {
                    cache.insert(key, results.clone());
                }
                results
            }
        };

        let Some(instruction) = instruction else {
            return Ok(GatewayResult::Raw {
                payload: results,
                warning: None,
            });
        };

        match self.compressor.compress_search(instruction, &results).await {
            Ok(text) => Ok(GatewayResult::Compressed(text)),
            Err(e) => {
                warn!("Compression failed, returning raw results: {}", e);
                Ok(GatewayResult::Raw {
                    payload: results,
                    warning: Some(COMPRESSION_FAILED_WARNING),
                })
            }
        }
    }

    /// One page-fetch round-trip, optionally compressed. The request's
    /// `timeout` bounds the scrape call.
    pub async fn crawl(
        &self,
        request: &CrawlRequest,
        instruction: Option<&str>,
    ) -> Result<GatewayResult<CrawlResult>, GatewayError> {
        check_instruction(instruction)?;

        let key = crawl_cache_key(request);
        let result = match self.crawl_cache.as_ref().and_then(|c| c.get(&key)) {
            Some(cached) => {
                debug!("Crawl cache hit: {}", key);
                cached
            }
            None => {
                let result = self.crawler.fetch(request).await?;
                if let Some(cache) = &self.crawl_cache {
                    cache.insert(key, result.clone());
                }
                result
            }
        };

        let Some(instruction) = instruction else {
            return Ok(GatewayResult::Raw {
                payload: result,
                warning: None,
            });
        };

        match self.compressor.compress_crawl(instruction, &result).await {
            Ok(text) => Ok(GatewayResult::Compressed(text)),
            Err(e) => {
                warn!("Compression failed, returning raw page content: {}", e);
                Ok(GatewayResult::Raw {
                    payload: result,
                    warning: Some(COMPRESSION_FAILED_WARNING),
                })
            }
        }
    }

    /// Probes both backends concurrently. Never fails; unreachable backends
    /// report as down.
    pub async fn health(&self) -> BackendHealth {
        let (search, scrape) = tokio::join!(self.searx.ping(), self.crawler.ping());
        BackendHealth { search, scrape }
    }
}

fn check_instruction(instruction: Option<&str>) -> Result<(), GatewayError> {
    if let Some(instruction) = instruction
        && instruction.trim().is_empty()
    {
        return Err(GatewayError::InvalidArgument(
            "Compression requires a non-empty instruction".to_string(),
        ));
    }
    Ok(())
}

fn search_cache_key(query: &SearchQuery) -> String {
    let categories = query
        .categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let time_range = query.time_range.map_or("", |r| r.as_str());

    format!(
        "{}|p{}|c{}|t{}",
        query.text.trim().to_lowercase(),
        query.page,
        categories,
        time_range
    )
}

fn crawl_cache_key(request: &CrawlRequest) -> String {
    format!(
        "{}|s{}|w{}",
        request.url,
        request.css_selector.as_deref().unwrap_or(""),
        request.wait_for.as_deref().unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, TimeRange};

    #[test]
    fn test_search_cache_key_normalizes_text() {
        let query = |text: &str| SearchQuery {
            text: text.to_string(),
            page: 1,
            categories: vec![Category::News],
            time_range: Some(TimeRange::Day),
        };

        assert_eq!(
            search_cache_key(&query("  Rust Async  ")),
            search_cache_key(&query("rust async"))
        );
        assert_ne!(
            search_cache_key(&query("rust")),
            search_cache_key(&query("rust async"))
        );
    }

    #[test]
    fn test_search_cache_key_includes_filters() {
        let base = SearchQuery {
            text: "rust".to_string(),
            page: 1,
            categories: Vec::new(),
            time_range: None,
        };
        let mut paged = base.clone();
        paged.page = 2;

        assert_ne!(search_cache_key(&base), search_cache_key(&paged));
    }

    #[test]
    fn test_crawl_cache_key_includes_selector() {
        let request = |selector: Option<&str>| CrawlRequest {
            url: url::Url::parse("https://example.com/page").unwrap(),
            css_selector: selector.map(str::to_string),
            wait_for: None,
            timeout: 30,
        };

        assert_ne!(
            crawl_cache_key(&request(None)),
            crawl_cache_key(&request(Some("article")))
        );
    }

    #[test]
    fn test_empty_instruction_rejected() {
        assert!(check_instruction(Some("   ")).is_err());
        assert!(check_instruction(Some("summarize")).is_ok());
        assert!(check_instruction(None).is_ok());
    }
}
