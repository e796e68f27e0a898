//! Anthropic Provider implementation
//!
//! Messages API with `x-api-key` authentication

use super::{GenerationParams, InvocationError, TextGenerator};
use crate::config::ProviderSettings;
use crate::models::anthropic::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

const PROVIDER_NAME: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Provider
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("promptlift/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
            model: model.into(),
        })
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.model.clone(),
            settings.timeout,
        )
    }

    fn build_url(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, system: &str, user: &str, params: &GenerationParams) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            system: Some(system.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            max_tokens: params.max_tokens,
            temperature: Some(params.temperature),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &GenerationParams,
    ) -> Result<String, InvocationError> {
        let api_key = self.api_key.as_deref().ok_or(InvocationError::NoCredential)?;

        debug!("Sending Anthropic messages request (model: {})", self.model);

        let response = self
            .client
            .post(self.build_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.build_request(system, user, params))
            .send()
            .await
            .map_err(|e| {
                InvocationError::provider_failure(PROVIDER_NAME, None, format!("Failed to send request: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<AnthropicErrorResponse>(&error_text) {
                Ok(error_response) => format!(
                    "Anthropic API error ({}): {}",
                    error_response.error.error_type, error_response.error.message
                ),
                Err(_) => format!("Anthropic API request failed: {} - {}", status, error_text),
            };
            error!("{}", message);
            return Err(InvocationError::provider_failure(
                PROVIDER_NAME,
                Some(status.as_u16()),
                message,
            ));
        }

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            InvocationError::provider_failure(
                PROVIDER_NAME,
                Some(status.as_u16()),
                format!("Failed to parse Anthropic response: {}", e),
            )
        })?;

        debug!("Anthropic request completed successfully");
        anthropic_response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| {
                InvocationError::provider_failure(
                    PROVIDER_NAME,
                    Some(status.as_u16()),
                    "Response contained no text block",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let provider =
            AnthropicProvider::new("https://api.anthropic.com/v1/", None, "claude-3-5-haiku-latest", 5).unwrap();
        assert_eq!(provider.build_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_build_request_puts_instruction_in_system() {
        let provider = AnthropicProvider::new(
            "https://api.anthropic.com/v1",
            Some("sk-ant-test-1234".to_string()),
            "claude-3-5-haiku-latest",
            5,
        )
        .unwrap();
        let params = GenerationParams {
            temperature: 0.0,
            max_tokens: 256,
        };
        let request = provider.build_request("instruction", "prompt", &params);
        assert_eq!(request.system.as_deref(), Some("instruction"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "prompt");
        assert_eq!(request.max_tokens, 256);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let provider = AnthropicProvider::new("http://127.0.0.1:9", None, "claude", 5).unwrap();
        let params = GenerationParams {
            temperature: 0.0,
            max_tokens: 16,
        };
        let result = provider.generate("s", "u", &params).await;
        assert_eq!(result, Err(InvocationError::NoCredential));
    }
}
