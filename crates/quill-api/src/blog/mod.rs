//! Blog posts: creation, visibility-aware reads, listings and author-only
//! mutation

pub mod service;

pub use service::{BlogService, CreateBlogRequest, ListBlogsQuery, ListOwnQuery, UpdateBlogRequest};
