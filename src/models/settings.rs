//! Optimization settings
//!
//! The three user-chosen dimensions that parameterize a rewrite. Each one is an
//! enumeration of the values the pipeline knows how to special-case, plus an
//! `Other` arm that carries any unrecognized value through as free text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model family the optimized prompt is written for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetModel {
    Gpt4,
    Claude,
    Generic,
    /// Unrecognized or missing value, kept verbatim
    Other(String),
}

/// Voice requested for the optimized prompt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tone {
    Neutral,
    Technical,
    Creative,
    Concise,
    /// Unrecognized or missing value, kept verbatim
    Other(String),
}

/// How elaborate the optimized prompt should be
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputPreference {
    Detailed,
    Short,
    /// Unrecognized or missing value, kept verbatim
    Other(String),
}

impl TargetModel {
    pub fn parse(value: &str) -> Self {
        match value {
            "gpt-4" => Self::Gpt4,
            "claude" => Self::Claude,
            "generic" => Self::Generic,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Claude => "claude",
            Self::Generic => "generic",
            Self::Other(value) => value,
        }
    }

    /// Whether the value is one of the known models
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Tone {
    pub fn parse(value: &str) -> Self {
        match value {
            "neutral" => Self::Neutral,
            "technical" => Self::Technical,
            "creative" => Self::Creative,
            "concise" => Self::Concise,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Neutral => "neutral",
            Self::Technical => "technical",
            Self::Creative => "creative",
            Self::Concise => "concise",
            Self::Other(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl OutputPreference {
    pub fn parse(value: &str) -> Self {
        match value {
            "detailed" => Self::Detailed,
            "short" => Self::Short,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Detailed => "detailed",
            Self::Short => "short",
            Self::Other(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

// An absent setting is an unresolved one: `Other("")`. No real default is invented.
impl Default for TargetModel {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Default for OutputPreference {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for TargetModel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TargetModel> for String {
    fn from(value: TargetModel) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for Tone {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Tone> for String {
    fn from(value: Tone) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for OutputPreference {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<OutputPreference> for String {
    fn from(value: OutputPreference) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TargetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OutputPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved optimization settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSettings {
    #[serde(default)]
    pub target_model: TargetModel,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub output_preference: OutputPreference,
}

impl OptimizationSettings {
    pub fn new(target_model: TargetModel, tone: Tone, output_preference: OutputPreference) -> Self {
        Self {
            target_model,
            tone,
            output_preference,
        }
    }

    /// Stable key used when grouping records by settings
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.target_model, self.tone, self.output_preference
        )
    }
}
