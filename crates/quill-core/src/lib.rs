//! Quill Core - Domain models, rules, and storage for the blogging platform
//!
//! This crate defines the pieces of Quill that do not depend on HTTP:
//! - Blog and user models, including the patch wrapper used for updates
//! - Domain error kinds with their HTTP-style status codes
//! - Authorization policy for viewing and modifying blogs
//! - Field validation and reading-time computation
//! - Blog queries and the storage adapter traits
//! - Configuration management

pub mod config;
pub mod models;
pub mod policy;
pub mod query;
pub mod store;
pub mod validation;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use models::{AuthorInfo, Blog, BlogPatch, BlogState, BlogView, Caller, NewBlog, NewUser, Patch, User, UserPublic};
pub use query::{BlogFilter, BlogQuery, Pagination, Sort, SortDirection, SortField};
pub use store::{BlogStore, Constraint, MemoryStore, PgStore, StoreError, UserStore};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Domain errors raised by validation, policy checks, and services
///
/// The `Display` output is the message shown to API clients; the status code
/// is chosen by [`QuillError::status_code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuillError {
    #[error("Required fields, {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Post with that title already exists.")]
    DuplicateTitle,

    #[error("User with email already exists")]
    DuplicateEmail,

    #[error("Password too short")]
    WeakPassword,

    #[error("{0}")]
    NotFound(String),

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Incorrect password")]
    BadCredentials,

    #[error("{0}")]
    InternalFault(String),
}

impl QuillError {
    /// HTTP status code associated with this error kind
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingFields(_)
            | Self::InvalidInput(_)
            | Self::DuplicateTitle
            | Self::DuplicateEmail
            | Self::WeakPassword => 400,
            Self::PermissionDenied(_) | Self::BadCredentials => 401,
            Self::NotFound(_) | Self::UserNotFound => 404,
            Self::InternalFault(_) => 500,
        }
    }

    pub fn blog_not_found() -> Self {
        Self::NotFound("Blog not found".to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalFault(message.into())
    }
}

/// Store faults are internal unless they hit a known unique constraint
impl From<StoreError> for QuillError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(Constraint::BlogTitle) => QuillError::DuplicateTitle,
            StoreError::UniqueViolation(Constraint::UserEmail) => QuillError::DuplicateEmail,
            StoreError::Backend(msg) => QuillError::InternalFault(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuillError>;
