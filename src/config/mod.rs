//! Configuration management module
//!
//! Responsible for loading and managing application configuration, including environment variables, configuration files, etc.

pub mod file;
pub mod settings;

pub use file::{AppConfig, ProviderConfig, ScoringFileConfig, ServerFileConfig};
pub use settings::{
    LoggingConfig, ProviderKind, ProviderSettings, RequestConfig, ScoringConfig, SecurityConfig,
    ServerConfig, Settings, UsageConfig,
};
