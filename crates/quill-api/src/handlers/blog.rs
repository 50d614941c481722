//! Blog API handlers

use super::{ApiJson, ApiQuery, ApiResponse};
use crate::blog::{CreateBlogRequest, ListBlogsQuery, ListOwnQuery, UpdateBlogRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use quill_core::Caller;
use std::sync::Arc;

/// Create a draft blog owned by the caller
#[utoipa::path(
    post,
    path = "/blog",
    tag = "blog",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog created as a draft", body = quill_core::BlogView),
        (status = 400, description = "Missing fields, bad tags or duplicate title", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiJson(request): ApiJson<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let blog = state.blogs.create(&caller, request).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(blog)))
}

/// List published blogs
///
/// `tags` may be repeated as well as comma-separated.
#[utoipa::path(
    get,
    path = "/blog",
    tag = "blog",
    params(ListBlogsQuery),
    responses(
        (status = 200, description = "Published blogs", body = [quill_core::BlogView]),
        (status = 400, description = "Invalid orderBy or pagination", body = crate::error::ApiError),
    )
)]
pub async fn list_blogs(
    State(state): State<Arc<AppState>>,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let query = ListBlogsQuery::from_pairs(pairs);
    let blogs = state.blogs.list_published(query).await?;
    Ok(ApiResponse::success(blogs))
}

/// List the caller's own blogs, drafts included
#[utoipa::path(
    get,
    path = "/blog/me",
    tag = "blog",
    params(ListOwnQuery),
    responses(
        (status = 200, description = "Caller's blogs", body = [quill_core::BlogView]),
        (status = 400, description = "Invalid state or pagination", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_own_blogs(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    ApiQuery(query): ApiQuery<ListOwnQuery>,
) -> Result<impl IntoResponse, AppError> {
    let blogs = state.blogs.list_own(caller.id, query).await?;
    Ok(ApiResponse::success(blogs))
}

/// Fetch one blog and count the read
///
/// Drafts are only visible to their author.
#[utoipa::path(
    get,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog with incremented read_count", body = quill_core::BlogView),
        (status = 401, description = "Draft not visible to caller", body = crate::error::ApiError),
        (status = 404, description = "Blog not found", body = crate::error::ApiError),
    )
)]
pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    caller: Option<Extension<Caller>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let caller = caller.map(|Extension(caller)| caller);
    let blog = state.blogs.get_by_id(&id, caller.as_ref()).await?;
    Ok(ApiResponse::success(blog))
}

/// Partially update a blog as its author
#[utoipa::path(
    patch,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = String, Path, description = "Blog id")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Updated blog", body = quill_core::BlogView),
        (status = 400, description = "Invalid state, tags or duplicate title", body = crate::error::ApiError),
        (status = 401, description = "Not the author", body = crate::error::ApiError),
        (status = 404, description = "Blog not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_blog(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    let blog = state.blogs.update(&id, caller.id, request).await?;
    Ok(ApiResponse::success(blog))
}

/// Delete a blog as its author
#[utoipa::path(
    delete,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 401, description = "Not the author", body = crate::error::ApiError),
        (status = 404, description = "Blog not found", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_blog(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.blogs.delete(&id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
