//! Optimization request and result models
//!
//! Defines the values flowing into and out of the optimization pipeline

use super::settings::OptimizationSettings;
use serde::{Deserialize, Serialize};

/// Validated optimization request
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRequest {
    /// Prompt as submitted by the user
    pub original_prompt: String,
    /// Resolved settings
    pub settings: OptimizationSettings,
}

impl OptimizationRequest {
    pub fn new(original_prompt: impl Into<String>, settings: OptimizationSettings) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            settings,
        }
    }
}

/// Per-criterion quality ratings, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaScores {
    pub clarity: u8,
    pub specificity: u8,
    pub structure: u8,
    pub context: u8,
    pub output_format: u8,
}

impl CriteriaScores {
    pub fn new(clarity: u8, specificity: u8, structure: u8, context: u8, output_format: u8) -> Self {
        Self {
            clarity,
            specificity,
            structure,
            context,
            output_format,
        }
    }

    /// Unweighted mean of the five criteria, rounded to the nearest integer
    pub fn aggregate(&self) -> u8 {
        let sum = self.clarity as u32
            + self.specificity as u32
            + self.structure as u32
            + self.context as u32
            + self.output_format as u32;
        // sum / 5 never lands exactly on .5, so +2 is round-half-up
        ((sum + 2) / 5) as u8
    }
}

/// Breakdown of both sides of a quality comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub original: CriteriaScores,
    pub optimized: CriteriaScores,
}

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Rewritten by the generative model
    Model,
    /// Rewritten by the offline template
    Fallback,
}

/// Value returned to the caller of `optimize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_prompt: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_improvement: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    pub source: ResultSource,
}

impl OptimizationResult {
    /// Result without any score fields
    pub fn unscored(
        optimized_prompt: impl Into<String>,
        explanation: impl Into<String>,
        source: ResultSource,
    ) -> Self {
        Self {
            optimized_prompt: optimized_prompt.into(),
            explanation: explanation.into(),
            original_score: None,
            optimized_score: None,
            score_improvement: None,
            score_breakdown: None,
            source,
        }
    }

    /// Attach a quality breakdown, deriving aggregate scores from it
    pub fn with_breakdown(mut self, breakdown: ScoreBreakdown) -> Self {
        let original = breakdown.original.aggregate();
        let optimized = breakdown.optimized.aggregate();
        self.original_score = Some(original);
        self.optimized_score = Some(optimized);
        self.score_improvement = Some(optimized as i32 - original as i32);
        self.score_breakdown = Some(breakdown);
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}
