//! Optimization orchestrator
//!
//! Drives one request through compose → invoke → parse → score, and routes
//! every failure of the model path to the offline fallback. Only input
//! validation can fail; everything after it always yields a result.

use super::composer::compose_instruction;
use super::fallback::fallback_optimize;
use super::parser::parse_reply;
use super::scorer::{QualityScorer, ScoreOutcome};
use crate::config::{ScoringConfig, Settings};
use crate::models::{OptimizationRequest, OptimizationResult, OptimizationSettings, ResultSource};
use crate::providers::{build_generator, GenerationParams, InvocationError, TextGenerator};
use crate::utils::error::{helpers, AppResult};
use crate::utils::logging::{create_request_log_summary, create_result_log_summary};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Check the prompt and capture the request
pub fn validate_request(
    prompt: Option<String>,
    settings: OptimizationSettings,
) -> AppResult<OptimizationRequest> {
    match prompt {
        Some(prompt) if !prompt.trim().is_empty() => Ok(OptimizationRequest::new(prompt, settings)),
        _ => Err(helpers::validation_error("Prompt is required")),
    }
}

/// Why the model path was abandoned
#[derive(Debug)]
enum InvokeFailure {
    Invocation(InvocationError),
    EmptyRewrite,
}

pub struct PromptOptimizer {
    generator: Arc<dyn TextGenerator>,
    scorer: QualityScorer,
    params: GenerationParams,
}

impl PromptOptimizer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        params: GenerationParams,
        scoring: ScoringConfig,
    ) -> Self {
        let scorer = QualityScorer::new(generator.clone(), scoring, params.max_tokens);
        Self {
            generator,
            scorer,
            params,
        }
    }

    /// Build the optimizer with the configured provider
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let generator = build_generator(&settings.provider)?;
        let params = GenerationParams {
            temperature: settings.provider.temperature,
            max_tokens: settings.provider.max_tokens,
        };
        Ok(Self::new(generator, params, settings.scoring.clone()))
    }

    pub fn provider_name(&self) -> &str {
        self.generator.name()
    }

    pub fn has_credential(&self) -> bool {
        self.generator.has_credential()
    }

    pub fn scoring_enabled(&self) -> bool {
        self.scorer.is_enabled()
    }

    /// Validate the input and optimize it
    pub async fn optimize(
        &self,
        original_prompt: &str,
        settings: OptimizationSettings,
    ) -> AppResult<OptimizationResult> {
        let request = validate_request(Some(original_prompt.to_string()), settings)?;
        Ok(self.run(&request).await)
    }

    /// Optimize an already validated request. Never fails.
    pub async fn run(&self, request: &OptimizationRequest) -> OptimizationResult {
        debug!("Optimization request: {}", create_request_log_summary(request));

        let result = match self.rewrite(request).await {
            Ok(result) => self.attach_scores(request, result).await,
            Err(InvokeFailure::Invocation(InvocationError::NoCredential)) => {
                info!("No provider credential configured, using offline fallback");
                fallback_optimize(&request.original_prompt, &request.settings)
            }
            Err(InvokeFailure::Invocation(e)) => {
                error!("Model invocation failed, using offline fallback: {}", e);
                fallback_optimize(&request.original_prompt, &request.settings)
            }
            Err(InvokeFailure::EmptyRewrite) => {
                warn!("Model reply contained an empty optimized prompt, using offline fallback");
                fallback_optimize(&request.original_prompt, &request.settings)
            }
        };

        debug!("Optimization result: {}", create_result_log_summary(&result));
        result
    }

    async fn rewrite(&self, request: &OptimizationRequest) -> Result<OptimizationResult, InvokeFailure> {
        let instruction = compose_instruction(&request.settings);

        let reply = self
            .generator
            .generate(&instruction, &request.original_prompt, &self.params)
            .await
            .map_err(InvokeFailure::Invocation)?;

        let parsed = parse_reply(&reply);
        if !parsed.follows_protocol() {
            warn!(
                "Model reply did not follow the section format (prompt marker: {}, explanation marker: {})",
                parsed.found_prompt_marker, parsed.found_explanation_marker
            );
        }

        if parsed.optimized_prompt.is_empty() {
            return Err(InvokeFailure::EmptyRewrite);
        }

        Ok(OptimizationResult::unscored(
            parsed.optimized_prompt,
            parsed.explanation,
            ResultSource::Model,
        ))
    }

    async fn attach_scores(
        &self,
        request: &OptimizationRequest,
        result: OptimizationResult,
    ) -> OptimizationResult {
        let outcome = self
            .scorer
            .score(&request.original_prompt, &result.optimized_prompt)
            .await;

        if let ScoreOutcome::Degraded(_) = outcome {
            info!("Reporting fallback quality scores");
        }

        match outcome.breakdown() {
            Some(breakdown) => result.with_breakdown(breakdown),
            None => result,
        }
    }
}
