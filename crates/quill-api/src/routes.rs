//! API route definitions

use crate::auth::middleware::{auth_middleware, optional_auth_middleware};
use crate::handlers::{auth, blog};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create the authentication and blog routes
///
/// Routes are grouped by how strictly they authenticate; axum merges the
/// method routers that share a path across groups.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/refresh", post(auth::refresh_handler));

    // Reader routes (token optional; drafts need one)
    let reader_routes = Router::new()
        .route("/blog", get(blog::list_blogs))
        .route("/blog/:id", get(blog::get_blog))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/blog", post(blog::create_blog))
        .route("/blog/me", get(blog::list_own_blogs))
        .route(
            "/blog/:id",
            axum::routing::patch(blog::update_blog).delete(blog::delete_blog),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(reader_routes)
        .merge(protected_routes)
}
