/// Markers reasoning models (e.g. deepseek-r1) wrap their deliberation in.
pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

/// A raw model reply split into its optional reasoning trace and the
/// user-facing answer. Derived on demand at render time; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub reasoning: Option<String>,
    pub answer: String,
}

impl ParsedReply {
    /// Split a raw reply on its reasoning block. Total: never fails for any
    /// input, including empty strings and unmatched markers.
    ///
    /// Without an opening marker the raw text passes through verbatim. With
    /// one, the reasoning is everything before the first `</think>` (opening
    /// literals removed, trimmed) and the answer is everything after the last
    /// `</think>`, trimmed. An opening marker with no close is passed through
    /// whole as the answer, marker included.
    pub fn parse(raw: &str) -> Self {
        if !raw.contains(THINK_OPEN) {
            return Self {
                reasoning: None,
                answer: raw.to_string(),
            };
        }

        let parts: Vec<&str> = raw.split(THINK_CLOSE).collect();
        let reasoning = parts[0].replace(THINK_OPEN, "").trim().to_string();
        // split() always yields at least one piece, so last() cannot be None
        let answer = parts.last().copied().unwrap_or(raw).trim().to_string();

        Self {
            reasoning: Some(reasoning),
            answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_passes_through_verbatim() {
        let parsed = ParsedReply::parse("  A migraine is a headache disorder.  ");
        assert_eq!(parsed.reasoning, None);
        // No trimming when no marker is present
        assert_eq!(parsed.answer, "  A migraine is a headache disorder.  ");
    }

    #[test]
    fn reasoning_block_is_split_from_the_answer() {
        let parsed = ParsedReply::parse("<think> weighing symptoms </think>\nSee a neurologist.");
        assert_eq!(parsed.reasoning.as_deref(), Some("weighing symptoms"));
        assert_eq!(parsed.answer, "See a neurologist.");
    }

    #[test]
    fn empty_input_yields_empty_answer() {
        let parsed = ParsedReply::parse("");
        assert_eq!(parsed.reasoning, None);
        assert_eq!(parsed.answer, "");
    }

    #[test]
    fn unmatched_opening_marker_passes_through_whole() {
        let parsed = ParsedReply::parse("<think>half a thought");
        assert_eq!(parsed.answer, "<think>half a thought");
        assert_eq!(parsed.reasoning.as_deref(), Some("half a thought"));
    }

    #[test]
    fn repeated_close_markers_use_last_part_as_answer() {
        let parsed = ParsedReply::parse("<think>first</think>middle</think> final answer ");
        assert_eq!(parsed.reasoning.as_deref(), Some("first"));
        assert_eq!(parsed.answer, "final answer");
    }

    #[test]
    fn reasoning_only_reply_yields_empty_answer() {
        let parsed = ParsedReply::parse("<think>all deliberation</think>");
        assert_eq!(parsed.reasoning.as_deref(), Some("all deliberation"));
        assert_eq!(parsed.answer, "");
    }
}
