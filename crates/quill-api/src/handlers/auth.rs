//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration, login and token refresh.

use super::{ApiJson, ApiResponse};
use crate::auth::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Register a new user account
///
/// # Responses
///
/// * `201 Created` - User registered; the password is never echoed
/// * `400 Bad Request` - Missing fields, duplicate email or short password
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = quill_core::UserPublic),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.register(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(user)))
}

/// Login with email and password
///
/// Returns an access token (1 hour) and a refresh token (7 days).
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = crate::auth::AuthResponse),
        (status = 400, description = "Missing fields", body = crate::error::ApiError),
        (status = 401, description = "Incorrect password", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.users.login(request).await?;
    Ok(ApiResponse::success(response))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = crate::auth::AuthResponse),
        (status = 401, description = "Invalid refresh token", body = crate::error::ApiError),
        (status = 404, description = "User no longer exists", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.users.refresh(request).await?;
    Ok(ApiResponse::success(response))
}
