//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const SERVICE_NAME: &str = "promptlift";

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// Generative provider name
    pub provider: String,
    /// Model sent upstream
    pub model: String,
    /// Whether an API key is configured; without one every request uses the fallback
    pub credential_configured: bool,
    pub scoring_enabled: bool,
    /// Uptime in seconds
    pub uptime_seconds: u64,
}

/// Basic health check
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");

    let credential_configured = state.optimizer.has_credential();
    let status = if credential_configured {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: Some(HealthDetails {
            provider: state.optimizer.provider_name().to_string(),
            model: state.settings.provider.model.clone(),
            credential_configured,
            scoring_enabled: state.optimizer.scoring_enabled(),
            uptime_seconds: get_uptime_seconds(),
        }),
    })
}

/// Liveness check
///
/// GET /health/live
/// Only confirms the process is serving; no dependencies are inspected
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details: None,
    })
}

/// Get service uptime in seconds
pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

/// Start the uptime clock
pub fn mark_started() {
    Lazy::force(&START_TIME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::test_state;

    #[tokio::test]
    async fn test_health_check_without_credential() {
        let state = Arc::new(test_state());
        let response = health_check(State(state)).await.0;

        // No API key in test settings: the service still answers, via fallback
        assert_eq!(response.status, "degraded");
        assert_eq!(response.service, "promptlift");
        let details = response.details.unwrap();
        assert_eq!(details.provider, "openai");
        assert!(!details.credential_configured);
        assert!(details.scoring_enabled);
    }

    #[tokio::test]
    async fn test_liveness_check() {
        let response = liveness_check().await.0;
        assert_eq!(response.status, "alive");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_uptime_calculation() {
        let uptime1 = get_uptime_seconds();
        std::thread::sleep(std::time::Duration::from_millis(100));
        let uptime2 = get_uptime_seconds();

        // The second call's uptime should be greater than or equal to the first
        assert!(uptime2 >= uptime1);
    }
}
