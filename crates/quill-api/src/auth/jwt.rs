//! JWT token generation and validation
//!
//! Implements JWT-based authentication with HMAC-SHA256 signing.
//! Access and refresh tokens carry the same identity claims and differ only
//! in lifetime and the `token_type` claim.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quill_core::{AuthConfig, Caller};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Which of the two issued tokens a claim set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims structure containing user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: Uuid,
    /// User's email address
    pub email: String,
    /// Token issuer
    pub iss: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    pub token_type: TokenKind,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
        }
    }
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Expected {expected:?} token")]
    WrongKind { expected: TokenKind },

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Access token expiration time in seconds (default: 3600 = 1 hour)
    pub access_expiration_secs: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_expiration_secs: u64,
    /// Token issuer identifier
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            access_expiration_secs: auth.access_expiration_secs,
            refresh_expiration_secs: auth.refresh_expiration_secs,
            issuer: auth.issuer.clone(),
        }
    }
}

impl JwtConfig {
    fn lifetime(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_expiration_secs,
            TokenKind::Refresh => self.refresh_expiration_secs,
        }
    }
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Generate a signed token of the given kind for a user
pub fn generate_token(
    config: &JwtConfig,
    kind: TokenKind,
    user_id: Uuid,
    email: &str,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        id: user_id,
        email: email.to_string(),
        iss: config.issuer.clone(),
        iat: now,
        exp: now + config.lifetime(kind),
        token_type: kind,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Issue both tokens for a user
pub fn issue_token_pair(
    config: &JwtConfig,
    user_id: Uuid,
    email: &str,
) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        access_token: generate_token(config, TokenKind::Access, user_id, email)?,
        refresh_token: generate_token(config, TokenKind::Refresh, user_id, email)?,
    })
}

/// Validate a token's signature, issuer and expiry, then check its kind
pub fn validate_token(
    config: &JwtConfig,
    token: &str,
    expected: TokenKind,
) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::InvalidToken,
    })?;

    if token_data.claims.token_type != expected {
        return Err(JwtError::WrongKind { expected });
    }

    Ok(token_data.claims)
}

/// Validate a bearer access token
pub fn validate_access_token(config: &JwtConfig, token: &str) -> Result<Claims, JwtError> {
    validate_token(config, token, TokenKind::Access)
}
