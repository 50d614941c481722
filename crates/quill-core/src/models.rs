//! Blog and user domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::reading_time;

// ============================================================================
// Users
// ============================================================================

/// Stored user record
///
/// `password_hash` is never serialized; clients only ever see [`UserPublic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Materialize the record with a fresh id and timestamps
    pub fn into_user(self) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Client-facing user projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Author sub-object embedded in blog responses
pub type AuthorInfo = UserPublic;

/// Identity of the caller, derived from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
}

// ============================================================================
// Blogs
// ============================================================================

/// Visibility state of a blog post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlogState {
    #[default]
    Draft,
    Published,
}

impl BlogState {
    /// Canonical upper-case form used in storage and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
        }
    }

    /// Case-insensitive parse; `None` for anything but draft/published
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("draft") {
            Some(Self::Draft)
        } else if value.eq_ignore_ascii_case("published") {
            Some(Self::Published)
        } else {
            None
        }
    }
}

impl std::fmt::Display for BlogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored blog record. `author` holds the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: Uuid,
    pub state: BlogState,
    pub reading_time: u32,
    pub read_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a blog; new blogs always start as unread drafts
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: Uuid,
}

impl NewBlog {
    pub fn into_blog(self) -> Blog {
        let now = Utc::now();
        Blog {
            id: Uuid::new_v4(),
            reading_time: reading_time(&self.body),
            title: self.title,
            description: self.description,
            body: self.body,
            tags: self.tags,
            author: self.author,
            state: BlogState::Draft,
            read_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single patchable field: either left alone or replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    /// Overwrite `target` when the field is set
    pub fn apply_to(&self, target: &mut T)
    where
        T: Clone,
    {
        if let Self::Set(value) = self {
            *target = value.clone();
        }
    }
}

impl Patch<String> {
    /// Empty strings and missing values both mean "do not modify"
    pub fn from_input(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::Set(v),
            _ => Self::Unset,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Unset,
        }
    }
}

/// Validated partial update of a blog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub body: Patch<String>,
    pub tags: Patch<Vec<String>>,
    pub state: Patch<BlogState>,
}

impl BlogPatch {
    /// New reading time, present only when the body changes
    pub fn reading_time(&self) -> Option<u32> {
        self.body.as_set().map(|body| reading_time(body))
    }

    pub fn is_empty(&self) -> bool {
        !(self.title.is_set()
            || self.description.is_set()
            || self.body.is_set()
            || self.tags.is_set()
            || self.state.is_set())
    }

    /// Apply the patch in place, bumping `updated_at`
    pub fn apply(&self, blog: &mut Blog) {
        self.title.apply_to(&mut blog.title);
        self.description.apply_to(&mut blog.description);
        self.body.apply_to(&mut blog.body);
        self.tags.apply_to(&mut blog.tags);
        self.state.apply_to(&mut blog.state);
        if let Some(minutes) = self.reading_time() {
            blog.reading_time = minutes;
        }
        blog.updated_at = Utc::now();
    }
}

/// Blog as returned to clients, with the author populated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: Option<UserPublic>,
    pub state: BlogState,
    pub reading_time: u32,
    pub read_count: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl BlogView {
    pub fn new(blog: Blog, author: Option<AuthorInfo>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            description: blog.description,
            body: blog.body,
            tags: blog.tags,
            author,
            state: blog.state,
            reading_time: blog.reading_time,
            read_count: blog.read_count,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blog() -> Blog {
        NewBlog {
            title: "Ownership".to_string(),
            description: "Borrowing explained".to_string(),
            body: "a".repeat(430),
            tags: vec!["rust".to_string()],
            author: Uuid::new_v4(),
        }
        .into_blog()
    }

    #[test]
    fn test_new_blog_defaults() {
        let blog = sample_blog();
        assert_eq!(blog.state, BlogState::Draft);
        assert_eq!(blog.read_count, 0);
        assert_eq!(blog.reading_time, 2);
    }

    #[test]
    fn test_blog_state_parse_is_case_insensitive() {
        assert_eq!(BlogState::parse("published"), Some(BlogState::Published));
        assert_eq!(BlogState::parse("DrAfT"), Some(BlogState::Draft));
        assert_eq!(BlogState::parse("archived"), None);
        assert_eq!(BlogState::Published.to_string(), "PUBLISHED");
    }

    #[test]
    fn test_blog_state_serializes_upper_case() {
        let json = serde_json::to_string(&BlogState::Published).unwrap();
        assert_eq!(json, "\"PUBLISHED\"");
    }

    #[test]
    fn test_patch_from_input_treats_empty_as_unset() {
        assert_eq!(Patch::<String>::from_input(Some(String::new())), Patch::Unset);
        assert_eq!(Patch::<String>::from_input(None), Patch::Unset);
        assert_eq!(
            Patch::<String>::from_input(Some("new".to_string())),
            Patch::Set("new".to_string())
        );
    }

    #[test]
    fn test_patch_apply_recomputes_reading_time_only_for_body() {
        let mut blog = sample_blog();
        let title_only = BlogPatch {
            title: Patch::Set("Lifetimes".to_string()),
            ..Default::default()
        };
        title_only.apply(&mut blog);
        assert_eq!(blog.title, "Lifetimes");
        assert_eq!(blog.reading_time, 2);

        let body = BlogPatch {
            body: Patch::Set("b".repeat(216)),
            ..Default::default()
        };
        body.apply(&mut blog);
        assert_eq!(blog.reading_time, 2);
        assert_eq!(blog.body.len(), 216);

        let short = BlogPatch {
            body: Patch::Set("tiny".to_string()),
            ..Default::default()
        };
        short.apply(&mut blog);
        assert_eq!(blog.reading_time, 1);
    }

    #[test]
    fn test_blog_view_serialization_shape() {
        let blog = sample_blog();
        let author = AuthorInfo {
            id: blog.author,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };
        let json = serde_json::to_value(BlogView::new(blog, Some(author))).unwrap();

        assert_eq!(json["state"], "DRAFT");
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
        assert_eq!(json["author"]["first_name"], "Ada");
        assert!(json["author"].get("password_hash").is_none());
    }
}
