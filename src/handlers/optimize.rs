//! Prompt optimization handler

use crate::handlers::AppState;
use crate::models::{OptimizationResult, PromptRecord};
use crate::services::{resolve_settings, validate_request, RawSettings};
use crate::utils::error::{helpers, AppError, AppResult};
use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request body for `POST /api/optimize`
///
/// Every field is optional at the serde level so that a missing prompt is
/// reported as a validation error rather than a deserialization failure.
/// Settings stay untyped here; a value of the wrong shape resolves to nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizeRequestBody {
    #[serde(default, alias = "originalPrompt")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub settings: Option<Value>,
}

/// Handle optimization requests
///
/// POST /api/optimize
pub async fn handle_optimize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<OptimizeRequestBody>,
) -> AppResult<Json<OptimizationResult>> {
    let settings = resolve_settings(body.settings.and_then(RawSettings::from_json));
    let request = validate_request(body.prompt, settings)?;
    let user_id = state.user_id(&headers);

    // Admission and counting happen together, before the model is called
    if let Some(user_id) = &user_id {
        let quota = state
            .usage
            .try_consume(user_id)
            .await
            .map_err(helpers::storage_error)?;
        if !quota.allowed {
            info!("Daily limit reached for user {}", user_id);
            return Err(AppError::RateLimit);
        }
        debug!("User {} has used {} optimizations today", user_id, quota.used);
    }

    let result = state.optimizer.run(&request).await;

    // A history failure never costs the caller their result
    if let Some(user_id) = user_id {
        let record = PromptRecord::from_result(user_id.as_str(), &request, &result);
        if let Err(e) = state.history.save(record).await {
            warn!("Failed to save history for user {}: {}", user_id, e);
        }
    }

    Ok(Json(result))
}
