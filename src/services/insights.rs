//! Usage insights over a user's recent history

use crate::models::{OptimizationSettings, PromptRecord};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Window covered by insights
pub const INSIGHTS_WINDOW_DAYS: i64 = 30;

const TOP_N: usize = 5;
const PROMPT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovedPrompt {
    pub id: Uuid,
    pub original_prompt: String,
    pub improvement: i32,
    pub original_score: Option<u8>,
    pub optimized_score: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPerformance {
    #[serde(flatten)]
    pub settings: OptimizationSettings,
    pub count: usize,
    pub avg_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub count: usize,
    pub avg_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub total_prompts: usize,
    pub avg_improvement: f64,
    pub most_improved: Vec<ImprovedPrompt>,
    pub best_settings: Vec<SettingsPerformance>,
    pub trend_data: Vec<DailyTrend>,
    pub total_original_tokens: u64,
    pub total_optimized_tokens: u64,
    pub token_savings: u64,
}

/// Start of the insights window ending at `now`
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(INSIGHTS_WINDOW_DAYS)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        round1(total as f64 / count as f64)
    }
}

/// Aggregate records already restricted to the insights window.
/// Unscored records count as zero improvement in averages.
pub fn compute_insights(records: &[PromptRecord]) -> Insights {
    let total_prompts = records.len();
    let improvement_sum: i64 = records
        .iter()
        .map(|r| r.score_improvement.unwrap_or(0) as i64)
        .sum();

    let mut scored: Vec<&PromptRecord> = records
        .iter()
        .filter(|r| r.score_improvement.is_some())
        .collect();
    scored.sort_by(|a, b| b.score_improvement.cmp(&a.score_improvement));

    let most_improved = scored
        .iter()
        .take(TOP_N)
        .map(|r| ImprovedPrompt {
            id: r.id,
            original_prompt: preview(&r.original_prompt),
            improvement: r.score_improvement.unwrap_or(0),
            original_score: r.original_score,
            optimized_score: r.optimized_score,
            timestamp: r.timestamp,
        })
        .collect();

    // Keyed by the settings triple so ties come out in a stable order
    let mut by_settings: BTreeMap<String, (OptimizationSettings, usize, i64)> = BTreeMap::new();
    for record in &scored {
        let entry = by_settings
            .entry(record.settings.key())
            .or_insert_with(|| (record.settings.clone(), 0, 0));
        entry.1 += 1;
        entry.2 += record.score_improvement.unwrap_or(0) as i64;
    }

    let mut best_settings: Vec<SettingsPerformance> = by_settings
        .into_values()
        .map(|(settings, count, total)| SettingsPerformance {
            settings,
            count,
            avg_improvement: mean(total, count),
        })
        .collect();
    best_settings.sort_by(|a, b| b.avg_improvement.total_cmp(&a.avg_improvement));
    best_settings.truncate(TOP_N);

    let mut by_day: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
    for record in records {
        let entry = by_day.entry(record.timestamp.date_naive()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.score_improvement.unwrap_or(0) as i64;
    }

    let trend_data = by_day
        .into_iter()
        .map(|(date, (count, total))| DailyTrend {
            date,
            count,
            avg_improvement: mean(total, count),
        })
        .collect();

    let total_original_tokens: u64 = records.iter().map(|r| r.original_tokens as u64).sum();
    let total_optimized_tokens: u64 = records.iter().map(|r| r.optimized_tokens as u64).sum();

    Insights {
        total_prompts,
        avg_improvement: mean(improvement_sum, total_prompts),
        most_improved,
        best_settings,
        trend_data,
        total_original_tokens,
        total_optimized_tokens,
        token_savings: total_original_tokens.saturating_sub(total_optimized_tokens),
    }
}

fn preview(prompt: &str) -> String {
    match prompt.char_indices().nth(PROMPT_PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &prompt[..byte_idx]),
        None => prompt.to_string(),
    }
}
