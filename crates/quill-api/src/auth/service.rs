//! Authentication service layer
//!
//! Provides business logic for user registration, login and token refresh on
//! top of a [`UserStore`].

use super::jwt::{issue_token_pair, validate_token, JwtConfig, TokenKind, TokenPair};
use super::password::{hash_password, is_password_long_enough, verify_password, PasswordConfig};
use quill_core::validation::require_fields;
use quill_core::{NewUser, QuillError, Result, UserPublic, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// User registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token refresh request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Authentication response with tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserPublic,
}

impl AuthResponse {
    fn new(tokens: TokenPair, user: UserPublic) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }
}

/// Registration, login and refresh
pub struct UserService {
    users: Arc<dyn UserStore>,
    jwt: JwtConfig,
    password: PasswordConfig,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtConfig, password: PasswordConfig) -> Self {
        Self {
            users,
            jwt,
            password,
        }
    }

    /// Register a new user
    ///
    /// Checks run in order: required fields, duplicate email, password length.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserPublic> {
        require_fields(&[
            (request.first_name.as_deref(), "first_name"),
            (request.last_name.as_deref(), "last_name"),
            (request.email.as_deref(), "email"),
            (request.password.as_deref(), "password"),
        ])?;

        let first_name = request.first_name.unwrap_or_default();
        let last_name = request.last_name.unwrap_or_default();
        let email = request.email.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(QuillError::DuplicateEmail);
        }

        if !is_password_long_enough(&password) {
            return Err(QuillError::WeakPassword);
        }

        let config = self.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| QuillError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| QuillError::internal(e.to_string()))?;

        let user = self
            .users
            .insert_user(NewUser {
                email,
                password_hash,
                first_name,
                last_name,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(UserPublic::from(&user))
    }

    /// Verify credentials and issue an access/refresh pair
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        require_fields(&[
            (request.email.as_deref(), "email"),
            (request.password.as_deref(), "password"),
        ])?;

        let email = request.email.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(QuillError::UserNotFound)?;

        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| QuillError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| QuillError::internal(e.to_string()))?;

        if !matches {
            tracing::warn!(user_id = %user.id, "Login failed: incorrect password");
            return Err(QuillError::BadCredentials);
        }

        let tokens = issue_token_pair(&self.jwt, user.id, &user.email)
            .map_err(|e| QuillError::internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse::new(tokens, UserPublic::from(&user)))
    }

    /// Exchange a refresh token for a fresh pair
    pub async fn refresh(&self, request: RefreshRequest) -> Result<AuthResponse> {
        require_fields(&[(request.refresh_token.as_deref(), "refreshToken")])?;
        let token = request.refresh_token.unwrap_or_default();

        let claims = validate_token(&self.jwt, &token, TokenKind::Refresh).map_err(|e| {
            tracing::warn!(error = %e, "Refresh token rejected");
            QuillError::permission_denied("Invalid token provided.")
        })?;

        let user = self
            .users
            .find_user_by_id(claims.id)
            .await?
            .ok_or(QuillError::UserNotFound)?;

        let tokens = issue_token_pair(&self.jwt, user.id, &user.email)
            .map_err(|e| QuillError::internal(e.to_string()))?;

        Ok(AuthResponse::new(tokens, UserPublic::from(&user)))
    }
}
