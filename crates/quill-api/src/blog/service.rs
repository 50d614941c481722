//! Blog service layer
//!
//! Orchestrates validation, access policy and storage for blog posts. Every
//! blog handed back to callers has its author populated.

use std::collections::HashMap;
use std::sync::Arc;

use quill_core::policy::{authorize_modify, authorize_view, Mutation};
use quill_core::validation::{require_fields, validate_order_by, validate_state_value, validate_tags};
use quill_core::{
    AuthorInfo, Blog, BlogFilter, BlogPatch, BlogQuery, BlogState, BlogStore, BlogView, Caller,
    NewBlog, Pagination, Patch, QuillError, Result, Sort, SortDirection, UserPublic, UserStore,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Blog creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<serde_json::Value>,
}

/// Partial blog update; empty or missing fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<serde_json::Value>,
    /// DRAFT or PUBLISHED, case-insensitive
    pub state: Option<String>,
}

/// Query string of the public listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBlogsQuery {
    /// Page size (default 20)
    pub limit: Option<String>,
    /// 1-indexed page (default 1)
    pub page: Option<String>,
    /// Author id
    pub author: Option<String>,
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Tags, comma-separated and/or repeated; any match
    #[serde(default)]
    pub tags: Vec<String>,
    /// read_count, reading_time, updatedAt or createdAt
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    /// `asc` for ascending; anything else descends
    #[serde(rename = "orderDirection")]
    pub order_direction: Option<String>,
}

impl ListBlogsQuery {
    /// Build from raw query pairs
    ///
    /// Single-valued keys keep their last occurrence; `tags` (or `tags[]`)
    /// accumulates every occurrence. Unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "limit" => query.limit = Some(value),
                "page" => query.page = Some(value),
                "author" => query.author = Some(value),
                "title" => query.title = Some(value),
                "tags" | "tags[]" => query.tags.push(value),
                "orderBy" => query.order_by = Some(value),
                "orderDirection" => query.order_direction = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// Query string of the caller's own listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOwnQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    /// DRAFT or PUBLISHED, case-insensitive
    pub state: Option<String>,
}

pub struct BlogService {
    blogs: Arc<dyn BlogStore>,
    users: Arc<dyn UserStore>,
}

impl BlogService {
    pub fn new(blogs: Arc<dyn BlogStore>, users: Arc<dyn UserStore>) -> Self {
        Self { blogs, users }
    }

    /// Create a draft owned by the caller
    pub async fn create(&self, caller: &Caller, request: CreateBlogRequest) -> Result<BlogView> {
        require_fields(&[
            (request.title.as_deref(), "title"),
            (request.body.as_deref(), "body"),
            (request.description.as_deref(), "description"),
        ])?;
        let tags = validate_tags(request.tags.as_ref())?.unwrap_or_default();

        let blog = self
            .blogs
            .insert_blog(NewBlog {
                title: request.title.unwrap_or_default(),
                description: request.description.unwrap_or_default(),
                body: request.body.unwrap_or_default(),
                tags,
                author: caller.id,
            })
            .await?;

        tracing::info!(blog_id = %blog.id, author = %caller.id, "Blog created");
        self.with_author(blog).await
    }

    /// Fetch one blog, counting the read
    pub async fn get_by_id(&self, id: &str, caller: Option<&Caller>) -> Result<BlogView> {
        let blog = self.load(id).await?;
        authorize_view(&blog, caller).inspect_err(|_| {
            tracing::warn!(blog_id = %blog.id, "Draft view denied");
        })?;

        let blog = self
            .blogs
            .increment_read_count(blog.id)
            .await?
            .ok_or_else(QuillError::blog_not_found)?;

        self.with_author(blog).await
    }

    /// Published blogs, filtered, sorted and paginated
    pub async fn list_published(&self, query: ListBlogsQuery) -> Result<Vec<BlogView>> {
        let sort = validate_order_by(query.order_by.as_deref())?.map(|field| Sort {
            field,
            direction: SortDirection::from_param(query.order_direction.as_deref()),
        });
        let pagination = Pagination::from_params(query.limit.as_deref(), query.page.as_deref())?;

        let author = match non_empty(query.author) {
            None => None,
            Some(raw) => match Uuid::parse_str(&raw) {
                Ok(id) => Some(id),
                // No blog can belong to a malformed id
                Err(_) => return Ok(Vec::new()),
            },
        };

        let filter = BlogFilter {
            author,
            title_contains: non_empty(query.title),
            tags_any: split_tags(&query.tags),
            state: Some(BlogState::Published),
        };

        self.list(BlogQuery::new(filter, sort, pagination)).await
    }

    /// The caller's own blogs, optionally restricted to one state
    pub async fn list_own(&self, caller_id: Uuid, query: ListOwnQuery) -> Result<Vec<BlogView>> {
        let pagination = Pagination::from_params(query.limit.as_deref(), query.page.as_deref())?;
        let state = validate_state_value(
            query.state.as_deref(),
            "State must be either PUBLISHED or DRAFT.",
        )?;

        let filter = BlogFilter {
            author: Some(caller_id),
            state,
            ..Default::default()
        };

        self.list(BlogQuery::new(filter, None, pagination)).await
    }

    /// Apply a partial update as the blog's author
    pub async fn update(
        &self,
        id: &str,
        caller_id: Uuid,
        request: UpdateBlogRequest,
    ) -> Result<BlogView> {
        let blog = self.load(id).await?;
        authorize_modify(&blog, caller_id, Mutation::Update).inspect_err(|_| {
            tracing::warn!(blog_id = %blog.id, caller = %caller_id, "Blog update denied");
        })?;

        let state = validate_state_value(request.state.as_deref(), "Invalid state provided")?;
        let tags = validate_tags(request.tags.as_ref())?;

        let patch = BlogPatch {
            title: Patch::from_input(request.title),
            description: Patch::from_input(request.description),
            body: Patch::from_input(request.body),
            tags: Patch::from(tags),
            state: Patch::from(state),
        };

        if patch.is_empty() {
            return self.with_author(blog).await;
        }

        let updated = self
            .blogs
            .update_blog(blog.id, &patch)
            .await?
            .ok_or_else(QuillError::blog_not_found)?;

        tracing::info!(blog_id = %updated.id, state = %updated.state, "Blog updated");
        self.with_author(updated).await
    }

    /// Remove a blog as its author
    pub async fn delete(&self, id: &str, caller_id: Uuid) -> Result<()> {
        let blog = self.load(id).await?;
        authorize_modify(&blog, caller_id, Mutation::Delete).inspect_err(|_| {
            tracing::warn!(blog_id = %blog.id, caller = %caller_id, "Blog deletion denied");
        })?;

        if !self.blogs.delete_blog(blog.id).await? {
            return Err(QuillError::blog_not_found());
        }

        tracing::info!(blog_id = %blog.id, "Blog deleted");
        Ok(())
    }

    /// Malformed ids are indistinguishable from missing blogs
    async fn load(&self, id: &str) -> Result<Blog> {
        let id = Uuid::parse_str(id).map_err(|_| QuillError::blog_not_found())?;
        self.blogs
            .find_blog(id)
            .await?
            .ok_or_else(QuillError::blog_not_found)
    }

    async fn list(&self, query: BlogQuery) -> Result<Vec<BlogView>> {
        tracing::debug!(?query, "Listing blogs");
        let blogs = self.blogs.find_blogs(&query).await?;

        let mut author_ids: Vec<Uuid> = blogs.iter().map(|b| b.author).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Uuid, AuthorInfo> = self
            .users
            .find_users_by_ids(&author_ids)
            .await?
            .iter()
            .map(|user| (user.id, UserPublic::from(user)))
            .collect();

        Ok(blogs
            .into_iter()
            .map(|blog| {
                let author = authors.get(&blog.author).cloned();
                BlogView::new(blog, author)
            })
            .collect())
    }

    async fn with_author(&self, blog: Blog) -> Result<BlogView> {
        let author = self
            .users
            .find_user_by_id(blog.author)
            .await?
            .map(|user| UserPublic::from(&user));
        Ok(BlogView::new(blog, author))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn split_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|tags| tags.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
