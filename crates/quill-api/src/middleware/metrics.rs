//! Metrics tracking middleware
//!
//! Tracks request latency, counts, and status classes per endpoint

use crate::state::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Endpoint key shared by every request that matched no route
pub const FALLBACK_ENDPOINT: &str = "<fallback>";

/// Metrics tracking middleware
///
/// Records:
/// - Request count per endpoint
/// - Request latency
/// - Response status classes
///
/// Requests are keyed by their route template, so the number of entries is
/// bounded by the routes the router declares.
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let endpoint = endpoint_key(request.extensions().get::<MatchedPath>());

    let response = next.run(request).await;

    let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
    state
        .record_request(endpoint, response.status().as_u16(), latency_us)
        .await;

    response
}

fn endpoint_key(matched: Option<&MatchedPath>) -> String {
    matched
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| FALLBACK_ENDPOINT.to_string())
}
