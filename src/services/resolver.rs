//! Settings resolution
//!
//! Turns the loosely-typed settings object from the request body into
//! `OptimizationSettings`. Nothing is rejected here: missing or unexpected
//! values are carried through as free text and the composer decides what to
//! do with them.

use crate::models::{OptimizationSettings, OutputPreference, TargetModel, Tone};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Settings exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default)]
    pub target_model: Option<Value>,
    #[serde(default)]
    pub tone: Option<Value>,
    #[serde(default)]
    pub output_preference: Option<Value>,
}

impl RawSettings {
    /// Read settings from any JSON value; anything but an object carries no settings
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            Value::Null => None,
            other => {
                debug!("Ignoring settings that are not an object: {}", other);
                None
            }
        }
    }
}

/// Resolve raw settings; never fails
pub fn resolve_settings(raw: Option<RawSettings>) -> OptimizationSettings {
    let raw = raw.unwrap_or_default();

    let settings = OptimizationSettings::new(
        TargetModel::parse(&free_text(raw.target_model.as_ref())),
        Tone::parse(&free_text(raw.tone.as_ref())),
        OutputPreference::parse(&free_text(raw.output_preference.as_ref())),
    );

    if !settings.target_model.is_known() {
        debug!("Unrecognized target model: {:?}", settings.target_model.as_str());
    }
    if !settings.tone.is_known() {
        debug!("Unrecognized tone: {:?}", settings.tone.as_str());
    }
    if !settings.output_preference.is_known() {
        debug!("Unrecognized output preference: {:?}", settings.output_preference.as_str());
    }

    settings
}

fn free_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
