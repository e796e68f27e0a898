//! OpenAI Provider implementation
//!
//! Standard OpenAI-compatible chat completion API

use super::{GenerationParams, InvocationError, TextGenerator};
use crate::config::ProviderSettings;
use crate::models::openai::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

const PROVIDER_NAME: &str = "openai";

/// OpenAI Provider
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
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

    /// Build the request URL
    fn build_url(&self) -> String {
        let base_url = self.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base_url)
    }

    fn build_request(&self, system: &str, user: &str, params: &GenerationParams) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage::system(system), OpenAIMessage::user(user)],
            temperature: Some(params.temperature),
            max_tokens: Some(params.max_tokens),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAIProvider {
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

        debug!("Sending OpenAI chat completion request (model: {})", self.model);

        let request = self.build_request(system, user, params);

        let response = self
            .client
            .post(self.build_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                InvocationError::provider_failure(PROVIDER_NAME, None, format!("Failed to send request: {}", e))
            })?;

        let status = response.status();

        if status.is_success() {
            let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
                InvocationError::provider_failure(
                    PROVIDER_NAME,
                    Some(status.as_u16()),
                    format!("Failed to parse OpenAI response: {}", e),
                )
            })?;

            debug!("OpenAI request completed successfully");
            openai_response
                .first_text()
                .map(str::to_string)
                .ok_or_else(|| {
                    InvocationError::provider_failure(
                        PROVIDER_NAME,
                        Some(status.as_u16()),
                        "Response contained no message content",
                    )
                })
        } else {
            let error_text = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(error_response) => {
                    error!("OpenAI API error: {:?}", error_response.error);
                    format!("OpenAI API error: {}", error_response.error.message)
                }
                Err(_) => {
                    error!("OpenAI API request failed: {} - {}", status, error_text);
                    format!("OpenAI API request failed: {} - {}", status, error_text)
                }
            };

            Err(InvocationError::provider_failure(
                PROVIDER_NAME,
                Some(status.as_u16()),
                message,
            ))
        }
    }
}
