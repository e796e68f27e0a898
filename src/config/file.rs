//! File-based configuration loading
//!
//! Optional JSON file overriding the environment-derived settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "promptlift.json";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerFileConfig {
    /// Listen host (default: "127.0.0.1" - localhost only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Application configuration loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerFileConfig>,

    /// Provider overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Scoring overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringFileConfig>,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type ("openai" or "anthropic")
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Base URL for the provider API
    #[serde(rename = "baseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key (can be empty if using env var)
    #[serde(rename = "apiKey", default, skip_serializing)]
    pub api_key: String,

    /// Model name to use with the upstream provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Temperature for the rewrite call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens for this model
    #[serde(rename = "maxTokens", default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Extra attempts after a failed call
    #[serde(rename = "maxRetries", default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Scoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringFileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(rename = "fallbackOnFailure", default, skip_serializing_if = "Option::is_none")]
    pub fallback_on_failure: Option<bool>,
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        debug!("Configuration file loaded: provider override = {}", config.provider.is_some());
        Ok(config)
    }

    /// Candidate file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("promptlift").join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        paths
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/promptlift/promptlift.json
    /// 2. ./promptlift.json
    ///
    /// Returns `Ok(None)` when no file exists; environment settings then apply alone.
    pub fn load_default() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                return Self::load(&path).map(Some);
            }
        }

        debug!("No configuration file found, using environment settings only");
        Ok(None)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if let Some(provider) = &self.provider {
            let valid_types = ["openai", "anthropic"];
            if !valid_types.contains(&provider.provider_type.to_lowercase().as_str()) {
                anyhow::bail!("Invalid provider type '{}'", provider.provider_type);
            }

            if let Some(base_url) = &provider.base_url {
                if !base_url.starts_with("http") {
                    anyhow::bail!("Invalid provider base URL: {}", base_url);
                }
            }

            if provider.model.as_deref() == Some("") {
                anyhow::bail!("Provider model cannot be empty");
            }
        }

        Ok(())
    }
}
