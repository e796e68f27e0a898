//! Logging utilities
//!
//! Shared logging configuration and helper functions

use crate::config::LoggingConfig;
use crate::models::{OptimizationRequest, OptimizationResult};

/// Set to true to include full prompt text in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((byte_idx, _)) => {
            let total = s.chars().count();
            format!("{}... ({} chars truncated)", &s[..byte_idx], total - max_len)
        }
        None => s.to_string(),
    }
}

/// Create a filtered summary of an optimization request for logging
pub fn create_request_log_summary(request: &OptimizationRequest) -> serde_json::Value {
    let prompt = if VERBOSE_REQUEST_LOGGING {
        request.original_prompt.clone()
    } else {
        truncate_content(&request.original_prompt, 200)
    };

    serde_json::json!({
        "prompt": prompt,
        "prompt_chars": request.original_prompt.chars().count(),
        "settings": request.settings,
    })
}

/// Create a filtered summary of an optimization result for logging
pub fn create_result_log_summary(result: &OptimizationResult) -> serde_json::Value {
    let prompt = if VERBOSE_REQUEST_LOGGING {
        result.optimized_prompt.clone()
    } else {
        truncate_content(&result.optimized_prompt, 200)
    };

    serde_json::json!({
        "source": result.source,
        "optimized_prompt": prompt,
        "original_score": result.original_score,
        "optimized_score": result.optimized_score,
    })
}

/// Initialize the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Tracing subscriber already set, keeping the existing one");
        return;
    }

    tracing::info!("Logging system initialized");
}
