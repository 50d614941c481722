//! API error handling
//!
//! Every failure leaves the server through [`AppError`], which renders the
//! `{message, status}` envelope and logs at a level matching the status.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::QuillError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned to clients
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable message
    pub message: String,
    /// HTTP status code, repeated in the body
    pub status: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Domain error raised by validation, policy or services
    Domain(QuillError),
    /// Request body or query string could not be decoded
    BadRequest(String),
    /// No route matched the request
    RouteNotFound,
    /// Unexpected failure outside the domain
    Internal(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Domain(err) => err.to_string(),
            AppError::Internal(err) => err.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::RouteNotFound => "Route not found".to_string(),
        }
    }

    /// Bearer header missing or not of the `Bearer` scheme
    pub fn unauthorized() -> Self {
        AppError::Domain(QuillError::permission_denied("Unauthorized"))
    }

    /// Bearer token failed verification
    pub fn invalid_token() -> Self {
        AppError::Domain(QuillError::permission_denied("Invalid token provided."))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Domain(QuillError::InternalFault(detail)) => {
                tracing::error!(status = status.as_u16(), error = %detail, "Request failed");
            }
            AppError::Internal(err) => {
                tracing::error!(status = status.as_u16(), error = ?err, "Request failed");
            }
            other => {
                tracing::warn!(status = status.as_u16(), error = %other.client_message(), "Request rejected");
            }
        }

        (status, Json(ApiError::new(status, self.client_message()))).into_response()
    }
}

impl From<QuillError> for AppError {
    fn from(err: QuillError) -> Self {
        AppError::Domain(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn envelope(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_domain_errors_keep_their_message() {
        let (status, json) = envelope(QuillError::DuplicateTitle.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Post with that title already exists.");
        assert_eq!(json["status"], 400);

        let (status, json) = envelope(QuillError::blog_not_found().into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Blog not found");
    }

    #[tokio::test]
    async fn test_auth_failures_are_401() {
        let (status, json) = envelope(AppError::unauthorized()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Unauthorized");

        let (_, json) = envelope(AppError::invalid_token()).await;
        assert_eq!(json["message"], "Invalid token provided.");
    }

    #[tokio::test]
    async fn test_internal_faults_carry_raw_message() {
        let (status, json) =
            envelope(QuillError::internal("connection refused on 10.0.0.3").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "connection refused on 10.0.0.3");
        assert_eq!(json["status"], 500);

        let (status, json) = envelope(anyhow::anyhow!("join error").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "join error");
    }

    #[tokio::test]
    async fn test_unknown_route_envelope() {
        let (status, json) = envelope(AppError::RouteNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], 404);
    }
}
