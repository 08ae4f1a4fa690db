use axum::{Json, extract::State};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::AppState;
use super::types::{HealthBackends, HealthResponse, ServiceInfo};

/// `GET /health`
///
/// Never fails; unreachable backends are reported as degraded status
/// instead of an error.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backends = state.gateway.health().await;

    let status = if backends.all_ok() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        backends: HealthBackends {
            search: backends.search,
            scrape: backends.scrape,
        },
    })
}

/// `GET /`
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "foray",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: BTreeMap::from([
            ("search", "GET /search?q=<query>&format=json"),
            ("crawl", "POST /crawl"),
            ("health", "GET /health"),
            ("metrics", "GET /metrics"),
        ]),
    })
}
