//! Offline fallback optimizer
//!
//! Deterministic template used whenever the model path cannot produce a
//! result. Never fails and makes no network calls.

use crate::models::{OptimizationResult, OptimizationSettings, ResultSource};

pub const FALLBACK_EXPLANATION: &str = "Added role definition, structured requirements, and output format specifications to improve prompt clarity and effectiveness.";

const OUTPUT_FORMAT_LINE: &str =
    "Output format: Provide your response in a structured, easy-to-understand format.";

/// Wrap the prompt in a role, requirements list, and output-format line
pub fn fallback_optimize(prompt: &str, settings: &OptimizationSettings) -> OptimizationResult {
    let target = settings.target_model.as_str().trim();
    let tone = settings.tone.as_str().trim();

    let role = if target.is_empty() {
        "You are an expert assistant.".to_string()
    } else {
        format!("You are an expert assistant specializing in {} interactions.", target)
    };

    let tone_requirement = if tone.is_empty() {
        "- Provide clear responses".to_string()
    } else {
        format!("- Provide clear, {} responses", tone)
    };

    let model_requirement = if target.is_empty() {
        "- Follow prompt-engineering best practices".to_string()
    } else {
        format!("- Follow best practices for {}", target)
    };

    let optimized = format!(
        "{}\n\nTask: {}\n\nRequirements:\n{}\n{}\n- Be specific and actionable\n\n{}",
        role,
        prompt.trim(),
        tone_requirement,
        model_requirement,
        OUTPUT_FORMAT_LINE
    );

    OptimizationResult::unscored(optimized, FALLBACK_EXPLANATION, ResultSource::Fallback)
}
