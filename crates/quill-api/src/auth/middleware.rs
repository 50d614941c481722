//! Authentication middleware for protecting routes
//!
//! Extracts and validates bearer tokens from the Authorization header. On
//! success the verified [`Caller`] is added to request extensions, where
//! handlers pick it up with `Extension<Caller>`.

use super::jwt::validate_access_token;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use quill_core::Caller;
use std::sync::Arc;

/// Token part of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that requires a valid access token
///
/// A missing, empty or non-Bearer header answers "Unauthorized"; a token that fails
/// verification answers "Invalid token provided.". Both are 401 and stop the
/// request before it reaches the handler.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(AppError::unauthorized)?;

    let claims = validate_access_token(&state.jwt, token).map_err(|e| {
        tracing::warn!(error = %e, path = %request.uri().path(), "Bearer token rejected");
        AppError::invalid_token()
    })?;

    request.extensions_mut().insert(Caller::from(claims));

    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Never fails: a missing or invalid token leaves the request anonymous.
pub async fn optional_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(request.headers())
        .and_then(|token| validate_access_token(&state.jwt, token).ok())
        .map(Caller::from);

    if let Some(caller) = caller {
        request.extensions_mut().insert(caller);
    }

    next.run(request).await
}
