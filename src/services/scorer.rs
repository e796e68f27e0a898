//! Quality scorer
//!
//! Rates the original and optimized prompts with a second model call. Scoring
//! is best-effort: any failure degrades to the fixed fallback pair (or to no
//! scores, depending on configuration) and never affects the optimized prompt.

use crate::config::ScoringConfig;
use crate::models::{CriteriaScores, ScoreBreakdown};
use crate::providers::{GenerationParams, TextGenerator};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ORIGINAL_SCORES_LABEL: &str = "ORIGINAL_SCORES:";
pub const OPTIMIZED_SCORES_LABEL: &str = "OPTIMIZED_SCORES:";

/// Criterion keys, in the order the reply must list them
const CRITERIA: [&str; 5] = ["clarity", "specificity", "structure", "context", "outputFormat"];

const FALLBACK_ORIGINAL: CriteriaScores = CriteriaScores {
    clarity: 50,
    specificity: 40,
    structure: 45,
    context: 40,
    output_format: 50,
};

const FALLBACK_OPTIMIZED: CriteriaScores = CriteriaScores {
    clarity: 85,
    specificity: 80,
    structure: 82,
    context: 78,
    output_format: 85,
};

/// Fixed breakdown reported when scoring cannot be measured (aggregates 45 and 82)
pub fn fallback_breakdown() -> ScoreBreakdown {
    ScoreBreakdown {
        original: FALLBACK_ORIGINAL,
        optimized: FALLBACK_OPTIMIZED,
    }
}

/// System instruction for the scoring call
pub fn scoring_instruction() -> String {
    let template = CRITERIA
        .iter()
        .map(|key| format!("{}=X", key))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert prompt evaluator. Rate two prompts, an ORIGINAL and an OPTIMIZED version, on five criteria. Each rating is an integer from 0 to 100.

Criteria:
- clarity: how clear and unambiguous the instructions are
- specificity: how precise the requirements and constraints are
- structure: how logically the prompt is organized
- context: how much relevant background and role information it provides
- outputFormat: how precisely the expected output is described

Respond with EXACTLY these two lines and nothing else:
{} {}
{} {}",
        ORIGINAL_SCORES_LABEL, template, OPTIMIZED_SCORES_LABEL, template
    )
}

fn scoring_message(original: &str, optimized: &str) -> String {
    format!("ORIGINAL PROMPT:\n{}\n\nOPTIMIZED PROMPT:\n{}", original, optimized)
}

/// Parse `clarity=X, specificity=X, structure=X, context=X, outputFormat=X`
fn parse_criteria(text: &str) -> Option<CriteriaScores> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != CRITERIA.len() {
        return None;
    }

    let mut values = [0u8; 5];
    for ((part, key), slot) in parts.iter().zip(CRITERIA).zip(values.iter_mut()) {
        let (name, value) = part.split_once('=')?;
        if name.trim() != key {
            return None;
        }
        let value = value.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = value.parse().ok()?;
        if value > 100 {
            return None;
        }
        *slot = value as u8;
    }

    let [clarity, specificity, structure, context, output_format] = values;
    Some(CriteriaScores::new(clarity, specificity, structure, context, output_format))
}

fn labeled_scores(raw: &str, label: &str) -> Option<CriteriaScores> {
    raw.lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .and_then(parse_criteria)
}

/// Parse a scoring reply; `None` on any deviation from the two-line protocol
pub fn parse_scores(raw: &str) -> Option<ScoreBreakdown> {
    Some(ScoreBreakdown {
        original: labeled_scores(raw, ORIGINAL_SCORES_LABEL)?,
        optimized: labeled_scores(raw, OPTIMIZED_SCORES_LABEL)?,
    })
}

/// Result of a scoring attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Scores parsed from the model's reply
    Measured(ScoreBreakdown),
    /// Scoring failed; fixed fallback pair reported instead
    Degraded(ScoreBreakdown),
    /// No scores reported
    Unavailable,
}

impl ScoreOutcome {
    pub fn breakdown(&self) -> Option<ScoreBreakdown> {
        match self {
            Self::Measured(breakdown) | Self::Degraded(breakdown) => Some(*breakdown),
            Self::Unavailable => None,
        }
    }
}

pub struct QualityScorer {
    generator: Arc<dyn TextGenerator>,
    config: ScoringConfig,
    max_tokens: u32,
}

impl QualityScorer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ScoringConfig, max_tokens: u32) -> Self {
        Self {
            generator,
            config,
            max_tokens,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Rate both prompts. Never fails.
    pub async fn score(&self, original: &str, optimized: &str) -> ScoreOutcome {
        if !self.config.enabled {
            return ScoreOutcome::Unavailable;
        }

        let params = GenerationParams {
            temperature: self.config.temperature,
            max_tokens: self.max_tokens,
        };

        let reply = match self
            .generator
            .generate(&scoring_instruction(), &scoring_message(original, optimized), &params)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Quality scoring call failed: {}", e);
                return self.degrade();
            }
        };

        match parse_scores(&reply) {
            Some(breakdown) => {
                debug!(
                    "Quality scores measured: {} -> {}",
                    breakdown.original.aggregate(),
                    breakdown.optimized.aggregate()
                );
                ScoreOutcome::Measured(breakdown)
            }
            None => {
                warn!("Quality scoring reply did not follow the score format");
                self.degrade()
            }
        }
    }

    fn degrade(&self) -> ScoreOutcome {
        if self.config.fallback_on_failure {
            ScoreOutcome::Degraded(fallback_breakdown())
        } else {
            ScoreOutcome::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::InvocationError;
    use async_trait::async_trait;

    struct FixedGenerator(Result<String, InvocationError>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        fn has_credential(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _system: &str,
            _user: &str,
            _params: &GenerationParams,
        ) -> Result<String, InvocationError> {
            self.0.clone()
        }
    }

    fn scorer(reply: Result<String, InvocationError>, enabled: bool, fallback_on_failure: bool) -> QualityScorer {
        QualityScorer::new(
            Arc::new(FixedGenerator(reply)),
            ScoringConfig {
                enabled,
                fallback_on_failure,
                temperature: 0.0,
            },
            256,
        )
    }

    const WELL_FORMED: &str = "ORIGINAL_SCORES: clarity=30, specificity=20, structure=25, context=10, outputFormat=15\n\
                               OPTIMIZED_SCORES: clarity=90, specificity=85, structure=88, context=80, outputFormat=92";

    #[test]
    fn test_fallback_breakdown_aggregates() {
        let breakdown = fallback_breakdown();
        assert_eq!(breakdown.original.aggregate(), 45);
        assert_eq!(breakdown.optimized.aggregate(), 82);
    }

    #[test]
    fn test_parse_well_formed_scores() {
        let breakdown = parse_scores(WELL_FORMED).unwrap();
        assert_eq!(breakdown.original, CriteriaScores::new(30, 20, 25, 10, 15));
        assert_eq!(breakdown.optimized, CriteriaScores::new(90, 85, 88, 80, 92));
    }

    #[test]
    fn test_parse_rejects_deviations() {
        // Wrong order
        assert!(parse_scores(
            "ORIGINAL_SCORES: specificity=20, clarity=30, structure=25, context=10, outputFormat=15\n\
             OPTIMIZED_SCORES: clarity=90, specificity=85, structure=88, context=80, outputFormat=92"
        )
        .is_none());
        // Missing key
        assert!(parse_scores(
            "ORIGINAL_SCORES: clarity=30, specificity=20, structure=25, context=10\n\
             OPTIMIZED_SCORES: clarity=90, specificity=85, structure=88, context=80, outputFormat=92"
        )
        .is_none());
        // Out of range
        assert!(parse_scores(
            "ORIGINAL_SCORES: clarity=130, specificity=20, structure=25, context=10, outputFormat=15\n\
             OPTIMIZED_SCORES: clarity=90, specificity=85, structure=88, context=80, outputFormat=92"
        )
        .is_none());
        // Signs, decimals and blanks are not bare digits
        for value in ["+50", "-0", "50.0", ""] {
            let original = format!(
                "ORIGINAL_SCORES: clarity={}, specificity=20, structure=25, context=10, outputFormat=15",
                value
            );
            let raw = format!(
                "{}\nOPTIMIZED_SCORES: clarity=90, specificity=85, structure=88, context=80, outputFormat=92",
                original
            );
            assert!(parse_scores(&raw).is_none(), "accepted {:?}", value);
        }
        // Missing second line
        assert!(parse_scores("ORIGINAL_SCORES: clarity=30, specificity=20, structure=25, context=10, outputFormat=15").is_none());
        assert!(parse_scores("The optimized prompt is much better.").is_none());
    }

    #[test]
    fn test_instruction_lists_criteria_in_order() {
        let instruction = scoring_instruction();
        assert!(instruction.contains(
            "ORIGINAL_SCORES: clarity=X, specificity=X, structure=X, context=X, outputFormat=X"
        ));
        assert!(instruction.contains("OPTIMIZED_SCORES: clarity=X"));
    }

    #[tokio::test]
    async fn test_score_measured() {
        let outcome = scorer(Ok(WELL_FORMED.to_string()), true, true).score("a", "b").await;
        assert!(matches!(outcome, ScoreOutcome::Measured(_)));
    }

    #[tokio::test]
    async fn test_score_degrades_on_failure() {
        let failure = Err(InvocationError::provider_failure("fixed", Some(500), "boom"));
        let outcome = scorer(failure.clone(), true, true).score("a", "b").await;
        assert_eq!(outcome, ScoreOutcome::Degraded(fallback_breakdown()));

        let outcome = scorer(failure, true, false).score("a", "b").await;
        assert_eq!(outcome, ScoreOutcome::Unavailable);

        let outcome = scorer(Ok("garbage".to_string()), true, true).score("a", "b").await;
        assert_eq!(outcome, ScoreOutcome::Degraded(fallback_breakdown()));
    }

    #[tokio::test]
    async fn test_disabled_scoring_is_unavailable() {
        let outcome = scorer(Ok(WELL_FORMED.to_string()), false, true).score("a", "b").await;
        assert_eq!(outcome, ScoreOutcome::Unavailable);
        assert_eq!(outcome.breakdown(), None);
    }
}
