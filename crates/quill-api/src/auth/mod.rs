//! Authentication module
//!
//! This module provides JWT-based authentication with the following components:
//! - Token generation and validation
//! - Password hashing with Argon2
//! - Middleware for request authentication
//! - User service for registration, login and token refresh

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{issue_token_pair, validate_access_token, Claims, JwtConfig, TokenKind};
pub use middleware::{auth_middleware, optional_auth_middleware};
pub use password::{hash_password, verify_password, PasswordConfig};
pub use service::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserService};
