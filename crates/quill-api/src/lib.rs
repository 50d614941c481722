//! Quill API - REST server for the blogging platform
//!
//! Provides HTTP endpoints for user registration and login and for creating,
//! reading, listing, updating and deleting blog posts.

pub mod auth;
pub mod blog;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register_handler,
        handlers::auth::login_handler,
        handlers::auth::refresh_handler,
        handlers::blog::create_blog,
        handlers::blog::list_blogs,
        handlers::blog::list_own_blogs,
        handlers::blog::get_blog,
        handlers::blog::update_blog,
        handlers::blog::delete_blog,
    ),
    components(schemas(
        quill_core::UserPublic,
        quill_core::BlogState,
        quill_core::BlogView,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::RefreshRequest,
        auth::AuthResponse,
        blog::CreateBlogRequest,
        blog::UpdateBlogRequest,
        error::ApiError,
        handlers::health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "blog", description = "Blog posts"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .merge(routes::api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Empty origin list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router over an in-memory store with cheap password hashing
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    use quill_core::{AppConfig, MemoryStore};

    let mut config = AppConfig::default();
    config.auth.jwt_secret = "quill-test-secret".to_string();

    let password = auth::PasswordConfig {
        memory_cost: 4096,
        time_cost: 1,
        parallelism: 1,
        output_len: Some(32),
    };

    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_password_config(config, store.clone(), store, password);
    create_router(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_blog_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/auth/register", "/auth/login", "/blog", "/blog/me", "/blog/{id}"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        for schema in ["BlogView", "UserPublic", "AuthResponse"] {
            assert!(components.schemas.contains_key(schema), "missing {schema}");
        }
    }
}
