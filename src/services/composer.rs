//! Instruction composer
//!
//! Builds the system instruction for the rewrite call. The output is a pure
//! function of the settings; the user's prompt travels separately as the user
//! message.

use super::parser::{EXPLANATION_MARKER, OPTIMIZED_PROMPT_MARKER};
use crate::models::{OptimizationSettings, OutputPreference, TargetModel, Tone};

const PREAMBLE: &str = "You are an expert prompt engineer specializing in optimizing prompts for LLMs like GPT-4 and Claude.

Your task: Analyze the user's prompt and rewrite it to be more effective using these best practices:

1. Add a clear role definition (e.g., \"You are an expert...\")
2. Define specific constraints and requirements
3. Specify the desired output format
4. Add task boundaries and assumptions
5. Use clear, unambiguous language
6. Structure the prompt logically";

const DETAILED_GUIDANCE: &str = "Create a comprehensive, well-structured prompt.

Expand the user's request into a complete brief: state the role, the background the model needs, the task broken into steps, the explicit constraints, and the exact shape of the expected output. Give each part its own paragraph or labeled section.

Where the original prompt leaves an important detail open, state a reasonable assumption explicitly instead of leaving it ambiguous.";

const CONCISE_GUIDANCE: &str = "Keep the optimized prompt concise. Include only the role, the task, the essential constraints, and the output format.";

/// Compose the system instruction for the given settings
pub fn compose_instruction(settings: &OptimizationSettings) -> String {
    let mut blocks = vec![preamble(settings)];

    if let Some(block) = tone_block(&settings.tone) {
        blocks.push(block.to_string());
    }
    blocks.push(length_block(&settings.output_preference).to_string());
    blocks.push(protocol_block());

    blocks.join("\n\n")
}

fn preamble(settings: &OptimizationSettings) -> String {
    let mut text = format!(
        "{}\n\nTarget Model: {}\nTone: {}\nOutput Preference: {}",
        PREAMBLE,
        settings.target_model.as_str(),
        settings.tone.as_str(),
        settings.output_preference.as_str()
    );

    if let Some(hint) = model_hint(&settings.target_model) {
        text.push_str("\n\n");
        text.push_str(hint);
    }

    text
}

fn model_hint(target: &TargetModel) -> Option<&'static str> {
    match target {
        TargetModel::Gpt4 => Some(
            "GPT-4 responds well to a short role line followed by numbered requirements and an explicit output format such as Markdown sections or JSON.",
        ),
        TargetModel::Claude => Some(
            "Claude responds well to clearly delimited sections, for example XML-style tags like <context> and <instructions>, and to stating what to do rather than what to avoid.",
        ),
        TargetModel::Generic => Some(
            "Keep the prompt model-agnostic: avoid vendor-specific syntax and rely on plain, well-labeled sections.",
        ),
        TargetModel::Other(_) => None,
    }
}

fn tone_block(tone: &Tone) -> Option<&'static str> {
    match tone {
        Tone::Technical => Some("Use precise technical language and explicit instructions."),
        Tone::Creative => Some("Allow for creative interpretation while maintaining clarity."),
        Tone::Concise => Some("Keep the prompt brief but comprehensive."),
        Tone::Neutral | Tone::Other(_) => None,
    }
}

fn length_block(preference: &OutputPreference) -> &'static str {
    match preference {
        OutputPreference::Detailed => DETAILED_GUIDANCE,
        OutputPreference::Short | OutputPreference::Other(_) => CONCISE_GUIDANCE,
    }
}

fn protocol_block() -> String {
    format!(
        "CRITICAL: Your response must follow this EXACT format:

{}
[The optimized prompt here]

{}
[Brief explanation of what changed and why, 2-3 sentences]

Do NOT include any other text outside this format.",
        OPTIMIZED_PROMPT_MARKER, EXPLANATION_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(target: &str, tone: &str, output: &str) -> OptimizationSettings {
        OptimizationSettings::new(
            TargetModel::parse(target),
            Tone::parse(tone),
            OutputPreference::parse(output),
        )
    }

    #[test]
    fn test_compose_is_deterministic() {
        let s = settings("claude", "creative", "detailed");
        assert_eq!(compose_instruction(&s), compose_instruction(&s.clone()));
    }

    #[test]
    fn test_echoes_settings() {
        let text = compose_instruction(&settings("gpt-4", "technical", "short"));
        assert!(text.contains("Target Model: gpt-4"));
        assert!(text.contains("Tone: technical"));
        assert!(text.contains("Output Preference: short"));
        assert!(text.contains("6. Structure the prompt logically"));
    }

    #[test]
    fn test_tone_blocks() {
        let technical = compose_instruction(&settings("gpt-4", "technical", "short"));
        assert!(technical.contains("Use precise technical language"));

        let creative = compose_instruction(&settings("gpt-4", "creative", "short"));
        assert!(creative.contains("Allow for creative interpretation"));

        let neutral = compose_instruction(&settings("gpt-4", "neutral", "short"));
        assert!(!neutral.contains("Use precise technical language"));
        assert!(!neutral.contains("Allow for creative interpretation"));
        assert!(!neutral.contains("Keep the prompt brief"));
    }

    #[test]
    fn test_length_blocks() {
        let detailed = compose_instruction(&settings("generic", "neutral", "detailed"));
        assert!(detailed.contains("Create a comprehensive, well-structured prompt."));
        assert!(!detailed.contains(CONCISE_GUIDANCE));

        // Anything but "detailed" gets the concise guidance
        for output in ["short", "medium", ""] {
            let text = compose_instruction(&settings("generic", "neutral", output));
            assert!(text.contains(CONCISE_GUIDANCE));
        }
    }

    #[test]
    fn test_model_hint_only_for_known_models() {
        assert!(compose_instruction(&settings("claude", "neutral", "short")).contains("XML-style tags"));
        let unknown = compose_instruction(&settings("mistral", "neutral", "short"));
        assert!(unknown.contains("Target Model: mistral"));
        assert!(!unknown.contains("XML-style tags"));
        assert!(!unknown.contains("GPT-4 responds well"));
    }

    #[test]
    fn test_ends_with_protocol() {
        let text = compose_instruction(&settings("gpt-4", "technical", "detailed"));
        assert!(text.contains("\nOPTIMIZED_PROMPT:\n"));
        assert!(text.contains("\nEXPLANATION:\n"));
        assert!(text.ends_with("Do NOT include any other text outside this format."));
    }
}
