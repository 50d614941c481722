//! Storage adapters
//!
//! Services talk to persistence only through [`UserStore`] and [`BlogStore`].
//! Two adapters are provided:
//! - [`MemoryStore`] keeps everything in process (tests, local development)
//! - [`PgStore`] persists to PostgreSQL via SQLx

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Blog, BlogPatch, NewBlog, NewUser, User};
use crate::query::BlogQuery;

/// Unique constraints the domain cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    BlogTitle,
    UserEmail,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0:?}")]
    UniqueViolation(Constraint),

    #[error("Storage error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `UniqueViolation(UserEmail)` on a taken email
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Fetch several users at once; unknown ids are skipped
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
}

/// Blog persistence
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a blog; fails with `UniqueViolation(BlogTitle)` on a taken title
    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog>;

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>>;

    async fn find_blogs(&self, query: &BlogQuery) -> StoreResult<Vec<Blog>>;

    /// Atomically add one to `read_count`, returning the updated record
    async fn increment_read_count(&self, id: Uuid) -> StoreResult<Option<Blog>>;

    /// Apply the set fields of `patch`, returning the updated record
    async fn update_blog(&self, id: Uuid, patch: &BlogPatch) -> StoreResult<Option<Blog>>;

    /// Returns whether a record was removed
    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool>;
}
