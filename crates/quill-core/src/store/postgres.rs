//! PostgreSQL store
//!
//! Uses SQLx with runtime-checked queries. The schema is created on connect
//! and uniqueness is enforced by named constraints, so duplicate titles and
//! emails surface as [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{BlogStore, Constraint, StoreError, StoreResult, UserStore};
use crate::models::{Blog, BlogPatch, BlogState, NewBlog, NewUser, User};
use crate::query::BlogQuery;

const UNIQUE_VIOLATION: &str = "23505";
const BLOG_TITLE_CONSTRAINT: &str = "blogs_title_unique";
const USER_EMAIL_CONSTRAINT: &str = "users_email_unique";

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, created_at, updated_at";
const BLOG_COLUMNS: &str = "id, title, description, body, tags, author, state, reading_time, read_count, created_at, updated_at";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_email_unique UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blogs (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        body TEXT NOT NULL,
        tags TEXT[] NOT NULL DEFAULT '{}',
        author UUID NOT NULL REFERENCES users (id),
        state TEXT NOT NULL DEFAULT 'DRAFT' CHECK (state IN ('DRAFT', 'PUBLISHED')),
        reading_time INTEGER NOT NULL,
        read_count BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT blogs_title_unique UNIQUE (title)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS blogs_author_idx ON blogs (author)",
    "CREATE INDEX IF NOT EXISTS blogs_state_idx ON blogs (state)",
];

/// PostgreSQL-backed user and blog store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("PostgreSQL connection failed: {e}")))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they are missing
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to apply schema: {e}")))?;
        }
        tracing::debug!("PostgreSQL schema ready");
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Translate SQLx failures, recognising the unique constraints we own
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            match db_err.constraint() {
                Some(BLOG_TITLE_CONSTRAINT) => {
                    return StoreError::UniqueViolation(Constraint::BlogTitle)
                }
                Some(USER_EMAIL_CONSTRAINT) => {
                    return StoreError::UniqueViolation(Constraint::UserEmail)
                }
                _ => {}
            }
        }
    }
    StoreError::Backend(err.to_string())
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Blog row from database
#[derive(Debug, FromRow)]
struct BlogRow {
    id: Uuid,
    title: String,
    description: String,
    body: String,
    tags: Vec<String>,
    author: Uuid,
    state: String,
    reading_time: i32,
    read_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogRow> for Blog {
    type Error = StoreError;

    fn try_from(row: BlogRow) -> Result<Self, Self::Error> {
        let state = BlogState::parse(&row.state)
            .ok_or_else(|| StoreError::Backend(format!("Unknown blog state: {}", row.state)))?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            body: row.body,
            tags: row.tags,
            author: row.author,
            state,
            reading_time: u32::try_from(row.reading_time).unwrap_or_default(),
            read_count: u64::try_from(row.read_count).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn row_to_blog(row: Option<BlogRow>) -> StoreResult<Option<Blog>> {
    row.map(Blog::try_from).transpose()
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let user = user.into_user();

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn insert_blog(&self, blog: NewBlog) -> StoreResult<Blog> {
        let blog = blog.into_blog();
        let reading_time = i32::try_from(blog.reading_time).unwrap_or(i32::MAX);

        let row: BlogRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO blogs (
                id, title, description, body, tags, author,
                state, reading_time, read_count, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10)
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(blog.id)
        .bind(&blog.title)
        .bind(&blog.description)
        .bind(&blog.body)
        .bind(&blog.tags)
        .bind(blog.author)
        .bind(blog.state.as_str())
        .bind(reading_time)
        .bind(blog.created_at)
        .bind(blog.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let row: Option<BlogRow> =
            sqlx::query_as(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row_to_blog(row)
    }

    async fn find_blogs(&self, query: &BlogQuery) -> StoreResult<Vec<Blog>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE TRUE"));

        let filter = &query.filter;
        if let Some(author) = filter.author {
            builder.push(" AND author = ").push_bind(author);
        }
        if let Some(state) = filter.state {
            builder.push(" AND state = ").push_bind(state.as_str());
        }
        if let Some(title) = &filter.title_contains {
            builder
                .push(" AND strpos(lower(title), lower(")
                .push_bind(title.clone())
                .push(")) > 0");
        }
        if !filter.tags_any.is_empty() {
            builder.push(" AND tags && ").push_bind(filter.tags_any.clone());
        }

        builder.push(" ORDER BY ");
        if let Some(sort) = &query.sort {
            builder
                .push(sort.field.column())
                .push(" ")
                .push(sort.direction.as_sql())
                .push(", ");
        }
        builder.push("created_at ASC, id ASC");

        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        tracing::debug!(sql = builder.sql(), "Listing blogs");

        let rows: Vec<BlogRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Blog::try_from).collect()
    }

    async fn increment_read_count(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let row: Option<BlogRow> = sqlx::query_as(&format!(
            "UPDATE blogs SET read_count = read_count + 1 WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row_to_blog(row)
    }

    async fn update_blog(&self, id: Uuid, patch: &BlogPatch) -> StoreResult<Option<Blog>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE blogs SET updated_at = NOW()");

        if let Some(title) = patch.title.as_set() {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = patch.description.as_set() {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(body) = patch.body.as_set() {
            builder.push(", body = ").push_bind(body.clone());
        }
        if let Some(minutes) = patch.reading_time() {
            builder
                .push(", reading_time = ")
                .push_bind(i32::try_from(minutes).unwrap_or(i32::MAX));
        }
        if let Some(tags) = patch.tags.as_set() {
            builder.push(", tags = ").push_bind(tags.clone());
        }
        if let Some(state) = patch.state.as_set() {
            builder.push(", state = ").push_bind(state.as_str());
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {BLOG_COLUMNS}"));

        let row: Option<BlogRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row_to_blog(row)
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
