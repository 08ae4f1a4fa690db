use reqwest::StatusCode;
use thiserror::Error;

pub mod crawl;
pub mod openrouter;
pub mod searx;

pub use crawl::CrawlClient;
pub use openrouter::OpenRouterClient;
pub use searx::SearxClient;

/// Failure of a single outbound backend call. Callers never retry; the
/// taxonomy only distinguishes "no answer in time" from "answered badly".
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        status: Option<StatusCode>,
        message: String,
    },

    #[error("{service} did not respond in time")]
    Timeout { service: &'static str },
}

impl ClientError {
    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { service }
        } else {
            Self::Unavailable {
                service,
                status: err.status(),
                message: err.to_string(),
            }
        }
    }

    pub(crate) fn bad_status(service: &'static str, status: StatusCode, body: String) -> Self {
        Self::Unavailable {
            service,
            status: Some(status),
            message: body,
        }
    }
}

/// Build the shared HTTP client reused by every backend client, so they all
/// draw from one connection pool.
pub fn build_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Foray/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}
