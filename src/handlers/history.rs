//! History, usage, and insights handlers
//!
//! All endpoints here require the caller's user id header.

use crate::handlers::AppState;
use crate::models::{PromptRecord, UsageRecord};
use crate::services::insights::window_start;
use crate::services::{compute_insights, Insights, QuotaStatus};
use crate::utils::error::{helpers, AppResult};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Maximum records returned by the history listing
pub const HISTORY_LIMIT: usize = 100;

/// Usage response
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    /// Stored counter; absent for users who never optimized
    pub usage: Option<UsageRecord>,
    pub quota: QuotaStatus,
}

/// GET /api/history
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<PromptRecord>>> {
    let user_id = state.require_user(&headers)?;
    let records = state
        .history
        .list_for_user(&user_id, HISTORY_LIMIT)
        .await
        .map_err(helpers::storage_error)?;
    debug!("Listing {} history records for user {}", records.len(), user_id);
    Ok(Json(records))
}

/// Look up a record owned by the caller; another user's record is reported as missing
async fn owned_record(state: &AppState, user_id: &str, id: Uuid) -> AppResult<PromptRecord> {
    match state.history.get(id).await.map_err(helpers::storage_error)? {
        Some(record) if record.user_id == user_id => Ok(record),
        _ => Err(helpers::not_found_error(format!("history record {}", id))),
    }
}

/// GET /api/history/:id
pub async fn get_history_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PromptRecord>> {
    let user_id = state.require_user(&headers)?;
    Ok(Json(owned_record(&state, &user_id, id).await?))
}

/// DELETE /api/history/:id
pub async fn delete_history_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user_id = state.require_user(&headers)?;
    owned_record(&state, &user_id, id).await?;
    state.history.delete(id).await.map_err(helpers::storage_error)?;
    info!("Deleted history record {} for user {}", id, user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/usage
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<UsageResponse>> {
    let user_id = state.require_user(&headers)?;
    let usage = state.usage.usage(&user_id).await.map_err(helpers::storage_error)?;
    let quota = state
        .usage
        .check_quota(&user_id)
        .await
        .map_err(helpers::storage_error)?;
    Ok(Json(UsageResponse { usage, quota }))
}

/// GET /api/insights
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Insights>> {
    let user_id = state.require_user(&headers)?;
    let records = state
        .history
        .list_since(&user_id, window_start(Utc::now()))
        .await
        .map_err(helpers::storage_error)?;
    Ok(Json(compute_insights(&records)))
}
