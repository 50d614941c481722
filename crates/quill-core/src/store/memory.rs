//! In-process store
//!
//! Records live in vectors kept in insertion order, which doubles as the
//! natural ordering for unsorted listings. Each mutation holds the write
//! lock for its whole check-and-write, so uniqueness and counters behave
//! atomically.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BlogStore, Constraint, StoreError, StoreResult, UserStore};
use crate::models::{Blog, BlogPatch, NewBlog, NewUser, User};
use crate::query::BlogQuery;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    blogs: RwLock<Vec<Blog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(Constraint::UserEmail));
        }

        let user = user.into_user();
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        let mut blogs = self.blogs.write().await;
        if blogs.iter().any(|b| b.title == blog.title) {
            return Err(StoreError::UniqueViolation(Constraint::BlogTitle));
        }

        let blog = blog.into_blog();
        blogs.push(blog.clone());
        Ok(blog)
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let blogs = self.blogs.read().await;
        Ok(blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn find_blogs(&self, query: &BlogQuery) -> StoreResult<Vec<Blog>> {
        let blogs = self.blogs.read().await;
        Ok(query.apply(blogs.iter()))
    }

    async fn increment_read_count(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let mut blogs = self.blogs.write().await;
        Ok(blogs.iter_mut().find(|b| b.id == id).map(|blog| {
            blog.read_count += 1;
            blog.clone()
        }))
    }

    async fn update_blog(&self, id: Uuid, patch: &BlogPatch) -> StoreResult<Option<Blog>> {
        let mut blogs = self.blogs.write().await;

        if let Some(title) = patch.title.as_set() {
            if blogs.iter().any(|b| b.id != id && &b.title == title) {
                return Err(StoreError::UniqueViolation(Constraint::BlogTitle));
            }
        }

        Ok(blogs.iter_mut().find(|b| b.id == id).map(|blog| {
            patch.apply(blog);
            blog.clone()
        }))
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let mut blogs = self.blogs.write().await;
        let before = blogs.len();
        blogs.retain(|b| b.id != id);
        Ok(blogs.len() != before)
    }
}
