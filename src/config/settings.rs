//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use super::file::AppConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Generative model provider configuration
    pub provider: ProviderSettings,
    /// Quality scoring configuration
    pub scoring: ScoringConfig,
    /// Usage quota configuration
    pub usage: UsageConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Supported provider wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `POST {base}/chat/completions`, reply in `choices[0].message.content`
    OpenAI,
    /// `POST {base}/messages`, reply in the first text block of `content`
    Anthropic,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => anyhow::bail!("Invalid provider type: {}", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

/// Generative model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Wire format of the provider
    pub kind: ProviderKind,
    /// API key; `None` puts the service in fallback-only mode
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model identifier sent upstream
    pub model: String,
    /// Sampling temperature for the rewrite call
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Extra attempts after a failed call (0 = at most one attempt)
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
}

impl ProviderSettings {
    /// Whether a usable credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

/// Quality scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Whether the second scoring call is made at all
    pub enabled: bool,
    /// On scoring failure, report the fixed fallback scores instead of omitting them
    pub fallback_on_failure: bool,
    /// Sampling temperature for the scoring call
    pub temperature: f32,
}

/// Usage quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Optimizations per day on the free plan
    pub free_daily_limit: u32,
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum request size in bytes
    pub max_request_size: usize,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Header carrying the authenticated user id, set by the upstream gateway
    pub user_id_header: String,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let kind = ProviderKind::parse(&get_env_or_default("PROVIDER_TYPE", "openai"))?;
        let api_key = std::env::var(kind.api_key_env())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "8080")
                    .parse()
                    .context("Invalid port number")?,
            },
            provider: ProviderSettings {
                kind,
                api_key,
                base_url: get_env_or_default("PROVIDER_BASE_URL", kind.default_base_url()),
                model: get_env_or_default("PROVIDER_MODEL", kind.default_model()),
                temperature: get_env_or_default("OPTIMIZE_TEMPERATURE", "0.3")
                    .parse()
                    .context("Invalid optimize temperature")?,
                max_tokens: get_env_or_default("PROVIDER_MAX_TOKENS", "2048")
                    .parse()
                    .context("Invalid provider max tokens")?,
                timeout: get_env_or_default("PROVIDER_TIMEOUT", "30")
                    .parse()
                    .context("Invalid provider timeout")?,
                max_retries: get_env_or_default("PROVIDER_MAX_RETRIES", "0")
                    .parse()
                    .context("Invalid provider max retries")?,
                retry_base_delay_ms: get_env_or_default("PROVIDER_RETRY_DELAY_MS", "500")
                    .parse()
                    .context("Invalid provider retry delay")?,
            },
            scoring: ScoringConfig {
                enabled: get_env_or_default("SCORING_ENABLED", "true")
                    .parse()
                    .context("Invalid scoring enabled flag")?,
                fallback_on_failure: get_env_or_default("SCORING_FALLBACK_ON_FAILURE", "true")
                    .parse()
                    .context("Invalid scoring fallback flag")?,
                temperature: get_env_or_default("SCORING_TEMPERATURE", "0.0")
                    .parse()
                    .context("Invalid scoring temperature")?,
            },
            usage: UsageConfig {
                free_daily_limit: get_env_or_default("FREE_DAILY_LIMIT", "10")
                    .parse()
                    .context("Invalid free daily limit")?,
            },
            request: RequestConfig {
                max_request_size: get_env_or_default("MAX_REQUEST_SIZE", "1048576")
                    .parse()
                    .context("Invalid maximum request size")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env_or_default("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                user_id_header: get_env_or_default("USER_ID_HEADER", "x-user-id"),
                cors_enabled: get_env_or_default("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Apply overrides from a JSON configuration file and re-validate
    pub fn apply_file_config(&mut self, file: &AppConfig) -> Result<()> {
        if let Some(server) = &file.server {
            self.server.host = server.host.clone();
            self.server.port = server.port;
        }

        if let Some(provider) = &file.provider {
            let kind = ProviderKind::parse(&provider.provider_type)?;
            if kind != self.provider.kind {
                // Switching wire format resets the kind-specific defaults
                self.provider.base_url = kind.default_base_url().to_string();
                self.provider.model = kind.default_model().to_string();
                self.provider.api_key = std::env::var(kind.api_key_env())
                    .ok()
                    .filter(|key| !key.trim().is_empty());
                self.provider.kind = kind;
            }
            if let Some(base_url) = &provider.base_url {
                self.provider.base_url = base_url.clone();
            }
            if let Some(model) = &provider.model {
                self.provider.model = model.clone();
            }
            if !provider.api_key.is_empty() {
                self.provider.api_key = Some(provider.api_key.clone());
            }
            if let Some(temperature) = provider.temperature {
                self.provider.temperature = temperature;
            }
            if let Some(max_tokens) = provider.max_tokens {
                self.provider.max_tokens = max_tokens;
            }
            if let Some(timeout) = provider.timeout {
                self.provider.timeout = timeout;
            }
            if let Some(max_retries) = provider.max_retries {
                self.provider.max_retries = max_retries;
            }
        }

        if let Some(scoring) = &file.scoring {
            if let Some(enabled) = scoring.enabled {
                self.scoring.enabled = enabled;
            }
            if let Some(fallback) = scoring.fallback_on_failure {
                self.scoring.fallback_on_failure = fallback;
            }
        }

        info!(
            "Applied file configuration: provider={} model={}",
            self.provider.kind.as_str(),
            self.provider.model
        );

        self.validate()
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        // Validate port range
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        // A present key must still look like a key
        if let Some(key) = &self.provider.api_key {
            if key.contains(char::is_whitespace) {
                anyhow::bail!("Provider API key cannot contain whitespace characters");
            }
            if key.len() < 8 {
                anyhow::bail!("Provider API key must be at least 8 characters long");
            }
        }

        // Validate URL format
        if !self.provider.base_url.starts_with("http") {
            anyhow::bail!("Invalid provider base URL format, should start with 'http'");
        }

        if self.provider.model.is_empty() {
            anyhow::bail!("Provider model cannot be empty");
        }

        // Validate timeout values
        if self.provider.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        for temperature in [self.provider.temperature, self.scoring.temperature] {
            if !(0.0..=2.0).contains(&temperature) {
                anyhow::bail!("Temperature must be between 0.0 and 2.0, got {}", temperature);
            }
        }

        if self.provider.max_tokens == 0 {
            anyhow::bail!("Provider max tokens cannot be 0");
        }

        // Validate request size limit
        if self.request.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        if self.security.user_id_header.is_empty() {
            anyhow::bail!("User id header name cannot be empty");
        }

        // Validate log filter; accepts anything EnvFilter does
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            anyhow::bail!("Invalid log filter '{}': {}", self.logging.level, e);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
