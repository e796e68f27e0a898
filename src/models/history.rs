//! History and usage records
//!
//! Shapes exchanged with the persistence and usage collaborators

use super::optimization::{OptimizationRequest, OptimizationResult};
use super::settings::OptimizationSettings;
use crate::utils::tokens::estimate_tokens;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub id: Uuid,
    pub user_id: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub settings: OptimizationSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_improvement: Option<i32>,
    pub original_tokens: u32,
    pub optimized_tokens: u32,
    pub timestamp: DateTime<Utc>,
}

impl PromptRecord {
    /// Build a record from a finished optimization
    pub fn from_result(
        user_id: impl Into<String>,
        request: &OptimizationRequest,
        result: &OptimizationResult,
    ) -> Self {
        let explanation = if result.explanation.is_empty() {
            None
        } else {
            Some(result.explanation.clone())
        };

        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            original_prompt: request.original_prompt.clone(),
            optimized_prompt: result.optimized_prompt.clone(),
            settings: request.settings.clone(),
            explanation,
            original_score: result.original_score,
            optimized_score: result.optimized_score,
            score_improvement: result.score_improvement,
            original_tokens: estimate_tokens(&request.original_prompt),
            optimized_tokens: estimate_tokens(&result.optimized_prompt),
            timestamp: Utc::now(),
        }
    }
}

/// Subscription plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

/// Daily usage counter for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub user_id: String,
    pub count: u32,
    pub last_reset: DateTime<Utc>,
    pub plan: Plan,
}

impl UsageRecord {
    pub fn new(user_id: impl Into<String>, plan: Plan, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            count: 0,
            last_reset: now,
            plan,
        }
    }
}
