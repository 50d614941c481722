//! API handlers
//!
//! Successful responses share the `{message: "success", data}` envelope.
//! Body and query extraction go through [`ApiJson`] and [`ApiQuery`] so that
//! decoding failures come back in the error envelope.

pub mod auth;
pub mod blog;
pub mod health;

use crate::error::AppError;
use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "success",
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// JSON body extractor answering malformed bodies with [`AppError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor answering malformed queries with [`AppError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Fallback for unmatched routes
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}
