//! Quill API Server
//!
//! REST API server for the Quill blogging platform.

use anyhow::Context;
use quill_api::{create_router, state::AppState};
use quill_core::config::{AppConfig, LoggingConfig};
use quill_core::{BlogStore, MemoryStore, PgStore, UserStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration: optional TOML file, then environment overrides
    let config = match std::env::var("QUILL_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("loading {path}"))?
            .with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    let (users, blogs) = match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, config.database.pool_size)
                .await
                .context("connecting to PostgreSQL")?;
            tracing::info!(pool_size = config.database.pool_size, "Using PostgreSQL store");
            store_handles(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data will not persist");
            store_handles(Arc::new(MemoryStore::new()))
        }
    };

    let addr = config.bind_address();

    // Create application state and router
    let state = Arc::new(AppState::new(config, users, blogs));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quill API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// One store serving both traits
fn store_handles<S>(store: Arc<S>) -> (Arc<dyn UserStore>, Arc<dyn BlogStore>)
where
    S: UserStore + BlogStore + 'static,
{
    (store.clone(), store)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("quill_api={0},quill_core={0},tower_http={0}", logging.level).into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
