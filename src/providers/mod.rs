//! Provider module
//!
//! Defines the `TextGenerator` capability and its provider adapters

pub mod anthropic;
pub mod openai;
pub mod retry;

use crate::config::{ProviderKind, ProviderSettings};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Per-call generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Failure of a single provider invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    /// No API key configured; no network call was made
    #[error("No API key configured for the generative model provider")]
    NoCredential,

    /// Transport, HTTP, or body-decoding failure
    #[error("Provider '{provider}' request failed: {message}")]
    ProviderFailure {
        provider: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
        message: String,
    },
}

impl InvocationError {
    pub fn provider_failure(
        provider: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderFailure {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoCredential => false,
            Self::ProviderFailure { status: None, .. } => true,
            Self::ProviderFailure { status: Some(status), .. } => *status == 429 || *status >= 500,
        }
    }
}

/// "Given (system, user, params), return text"
///
/// Implementations make exactly one outbound call per `generate` and return the
/// first text segment of the reply verbatim.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Whether a credential is configured
    fn has_credential(&self) -> bool;

    /// Send a system instruction and a user message, get back the reply text
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, InvocationError>;
}

/// Build the configured generator, wrapped with retries when enabled
pub fn build_generator(settings: &ProviderSettings) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match settings.kind {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::from_settings(settings)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::from_settings(settings)?),
    };

    info!(
        "Generative provider initialized: {} ({}), credential configured: {}",
        generator.name(),
        settings.model,
        generator.has_credential()
    );

    if settings.max_retries > 0 {
        let config = RetryConfig {
            max_retries: settings.max_retries,
            base_delay_ms: settings.retry_base_delay_ms,
            ..RetryConfig::default()
        };
        return Ok(Arc::new(RetryingGenerator::new(generator, config)));
    }

    Ok(generator)
}

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;
pub use retry::{RetryConfig, RetryingGenerator};
