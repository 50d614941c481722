//! Application state management

use crate::auth::{JwtConfig, PasswordConfig, UserService};
use crate::blog::BlogService;
use quill_core::config::AppConfig;
use quill_core::{BlogStore, UserStore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Per-endpoint request statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointMetrics {
    pub request_count: u64,
    /// Counts keyed by status class (`2xx`, `4xx`, ...)
    pub status_counts: BTreeMap<String, u64>,
    pub total_latency_us: u64,
    pub min_latency_us: u64,
    pub max_latency_us: u64,
}

impl EndpointMetrics {
    fn record(&mut self, status: u16, latency_us: u64) {
        if self.request_count == 0 || latency_us < self.min_latency_us {
            self.min_latency_us = latency_us;
        }
        self.max_latency_us = self.max_latency_us.max(latency_us);
        self.request_count += 1;
        self.total_latency_us += latency_us;
        *self
            .status_counts
            .entry(format!("{}xx", status / 100))
            .or_insert(0) += 1;
    }

    pub fn average_latency_us(&self) -> u64 {
        self.total_latency_us
            .checked_div(self.request_count)
            .unwrap_or(0)
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token signing settings, shared by the auth middleware
    pub jwt: JwtConfig,
    pub users: UserService,
    pub blogs: BlogService,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Request statistics keyed by normalized endpoint
    pub metrics: RwLock<BTreeMap<String, EndpointMetrics>>,
}

impl AppState {
    /// Create application state over explicit store handles
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        blogs: Arc<dyn BlogStore>,
    ) -> Self {
        Self::with_password_config(config.clone(), users, blogs, PasswordConfig::from(&config.auth))
    }

    /// Same as [`AppState::new`] with explicit Argon2 costs
    pub fn with_password_config(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        blogs: Arc<dyn BlogStore>,
        password: PasswordConfig,
    ) -> Self {
        let jwt = JwtConfig::from(&config.auth);
        Self {
            users: UserService::new(users.clone(), jwt.clone(), password),
            blogs: BlogService::new(blogs, users),
            jwt,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            metrics: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Record one finished request
    pub async fn record_request(&self, endpoint: String, status: u16, latency_us: u64) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.metrics
            .write()
            .await
            .entry(endpoint)
            .or_default()
            .record(status, latency_us);
    }

    /// Copy of the current per-endpoint statistics
    pub async fn endpoint_metrics(&self) -> BTreeMap<String, EndpointMetrics> {
        self.metrics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::MemoryStore;

    #[tokio::test]
    async fn test_record_request_aggregates_by_endpoint() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(AppConfig::default(), store.clone(), store);

        state.record_request("/blog".to_string(), 200, 100).await;
        state.record_request("/blog".to_string(), 404, 300).await;
        state.record_request("/health".to_string(), 200, 50).await;

        assert_eq!(state.get_request_count(), 3);

        let metrics = state.endpoint_metrics().await;
        let blog = &metrics["/blog"];
        assert_eq!(blog.request_count, 2);
        assert_eq!(blog.status_counts["2xx"], 1);
        assert_eq!(blog.status_counts["4xx"], 1);
        assert_eq!(blog.min_latency_us, 100);
        assert_eq!(blog.max_latency_us, 300);
        assert_eq!(blog.average_latency_us(), 200);
    }
}
