//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod history;
pub mod optimize;

use crate::config::{SecurityConfig, Settings};
use crate::middleware::request_logging_middleware;
use crate::services::{
    HistoryStore, InMemoryHistoryStore, InMemoryUsageLedger, PromptOptimizer, UsageLedger,
};
use crate::utils::error::{helpers, AppResult};
use anyhow::Result;
use axum::{
    http::{HeaderMap, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub optimizer: Arc<PromptOptimizer>,
    pub history: Arc<dyn HistoryStore>,
    pub usage: Arc<dyn UsageLedger>,
}

impl AppState {
    /// State with in-memory collaborators
    pub fn new(settings: Settings, optimizer: PromptOptimizer) -> Self {
        let usage = Arc::new(InMemoryUsageLedger::new(settings.usage.free_daily_limit));
        Self {
            settings,
            optimizer: Arc::new(optimizer),
            history: Arc::new(InMemoryHistoryStore::new()),
            usage,
        }
    }

    /// State with the configured provider
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let optimizer = PromptOptimizer::from_settings(&settings)?;
        Ok(Self::new(settings, optimizer))
    }

    /// Caller identity from the configured header, if present and non-blank
    pub fn user_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(self.settings.security.user_id_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Caller identity, or 401
    pub fn require_user(&self, headers: &HeaderMap) -> AppResult<String> {
        self.user_id(headers).ok_or_else(|| {
            helpers::auth_error(format!(
                "missing {} header",
                self.settings.security.user_id_header
            ))
        })
    }
}

/// Create application router from settings
pub fn create_router(settings: Settings) -> Result<Router> {
    Ok(build_router(AppState::from_settings(settings)?))
}

/// Create application router around an existing state
pub fn build_router(state: AppState) -> Router {
    let security = state.settings.security.clone();
    let max_request_size = state.settings.request.max_request_size;

    let router = Router::new()
        .route("/api/optimize", post(optimize::handle_optimize))
        .route("/api/history", get(history::list_history))
        .route(
            "/api/history/:id",
            get(history::get_history_item).delete(history::delete_history_item),
        )
        .route("/api/usage", get(history::get_usage))
        .route("/api/insights", get(history::get_insights))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(Arc::new(state));

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(RequestBodyLimitLayer::new(max_request_size));

    let router = router.layer(middleware_stack);

    if security.cors_enabled {
        router.layer(cors_layer(&security))
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let allow_origin = if security.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = security
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::settings::tests::test_settings;

    /// State with no provider credential, so every optimization takes the fallback
    pub(crate) fn test_state() -> AppState {
        AppState::from_settings(test_settings()).unwrap()
    }

    #[test]
    fn test_user_id_extraction() {
        let state = test_state();
        let mut headers = HeaderMap::new();
        assert_eq!(state.user_id(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("  "));
        assert_eq!(state.user_id(&headers), None);
        assert!(state.require_user(&headers).is_err());

        headers.insert("x-user-id", HeaderValue::from_static("alice"));
        assert_eq!(state.require_user(&headers).unwrap(), "alice");
    }

    fn preflight(origin: &str) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/optimize")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        use tower::ServiceExt;

        let mut settings = test_settings();
        settings.security.cors_enabled = true;
        settings.security.allowed_origins = vec!["https://app.example.com".to_string()];
        let app = build_router(AppState::from_settings(settings).unwrap());

        let response = app.clone().oneshot(preflight("https://app.example.com")).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://app.example.com"
        );

        let response = app.oneshot(preflight("https://evil.example.com")).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
