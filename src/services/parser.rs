//! Model reply parser
//!
//! Extracts the optimized prompt and explanation from the free-text reply.
//! The reply protocol is two marker lines, `OPTIMIZED_PROMPT:` and
//! `EXPLANATION:`, each followed by its section. Parsing never fails: every
//! combinator below has an explicit no-match path.

pub const OPTIMIZED_PROMPT_MARKER: &str = "OPTIMIZED_PROMPT:";
pub const EXPLANATION_MARKER: &str = "EXPLANATION:";

/// Substituted when the reply carries no usable explanation
pub const DEFAULT_EXPLANATION: &str =
    "The prompt has been optimized with clearer structure and specific instructions.";

/// Structured view of a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub optimized_prompt: String,
    pub explanation: String,
    /// Whether the `OPTIMIZED_PROMPT:` marker was found
    pub found_prompt_marker: bool,
    /// Whether the `EXPLANATION:` marker was found
    pub found_explanation_marker: bool,
}

impl ParsedReply {
    /// Whether the reply followed the two-section protocol
    pub fn follows_protocol(&self) -> bool {
        self.found_prompt_marker && self.found_explanation_marker
    }
}

/// One line of the reply, with byte offsets into the full text
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    text: &'a str,
}

/// A marker line: where it starts and where its section content begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarkerMatch {
    line_start: usize,
    content_start: usize,
}

fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        Line { start, text }
    })
}

/// Match `marker` at the start of a single line (leading whitespace allowed)
fn marker_line(line: Line<'_>, marker: &str) -> Option<MarkerMatch> {
    let rest = line.text.trim_start().strip_prefix(marker)?;
    Some(MarkerMatch {
        line_start: line.start,
        content_start: line.start + (line.text.len() - rest.len()),
    })
}

/// First marker line starting at or after byte `from`
fn find_marker(text: &str, marker: &str, from: usize) -> Option<MarkerMatch> {
    lines(text)
        .filter(|line| line.start >= from)
        .find_map(|line| marker_line(line, marker))
}

/// Text after the `open` marker line, up to the `close` marker line or end of text
fn section<'a>(text: &'a str, open: &str, close: Option<&str>) -> Option<&'a str> {
    let start = find_marker(text, open, 0)?;
    let end = close
        .and_then(|close| find_marker(text, close, start.content_start))
        .map(|m| m.line_start)
        .unwrap_or(text.len());
    Some(&text[start.content_start..end])
}

/// Parse a raw model reply
pub fn parse_reply(raw: &str) -> ParsedReply {
    let prompt_section = section(raw, OPTIMIZED_PROMPT_MARKER, Some(EXPLANATION_MARKER));
    let explanation_section = section(raw, EXPLANATION_MARKER, None);

    let optimized_prompt = prompt_section.unwrap_or(raw).trim().to_string();

    let explanation = explanation_section
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EXPLANATION)
        .to_string();

    ParsedReply {
        optimized_prompt,
        explanation,
        found_prompt_marker: prompt_section.is_some(),
        found_explanation_marker: explanation_section.is_some(),
    }
}
