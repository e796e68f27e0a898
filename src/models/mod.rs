//! Data models module
//!
//! Defines pipeline values, history records, and provider wire structures

pub mod anthropic;
pub mod history;
pub mod openai;
pub mod optimization;
pub mod settings;

pub use history::{Plan, PromptRecord, UsageRecord};
pub use optimization::{
    CriteriaScores, OptimizationRequest, OptimizationResult, ResultSource, ScoreBreakdown,
};
pub use settings::{OptimizationSettings, OutputPreference, TargetModel, Tone};
