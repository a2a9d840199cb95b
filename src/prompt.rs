use crate::transcript::{Role, Transcript};

/// Fixed persona instruction sent as the first message of every model call.
pub const SYSTEM_PROMPT: &str = "You are BrainAI, an AI-powered neurologist assistant designed to provide \
non-emergency guidance, education, and support for neurological health. Your expertise includes brain \
anatomy, neurological disorders (e.g., epilepsy, Alzheimer's, brain tumors, migraines), symptoms, \
diagnostics, and general brain health tips. Always prioritize ethical guidelines, clarify your \
limitations, and emphasize consulting a licensed professional for personal care. Answer only in \
English language.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    Human,
    Ai,
}

#[derive(Debug, Clone)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

/// Convert the transcript into the ordered message sequence for a model call.
///
/// The system persona always comes first, then one message per turn in
/// transcript order with the content carried verbatim (including any embedded
/// `<think>` markup). The result always has length `1 + transcript.len()`.
pub fn assemble(transcript: &Transcript) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(1 + transcript.len());
    messages.push(PromptMessage {
        role: PromptRole::System,
        content: SYSTEM_PROMPT.to_string(),
    });

    for turn in transcript.turns() {
        let role = match turn.role {
            Role::User => PromptRole::Human,
            Role::Assistant => PromptRole::Ai,
        };
        messages.push(PromptMessage {
            role,
            content: turn.content.clone(),
        });
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Turn;

    #[test]
    fn assembled_sequence_starts_with_the_system_prompt() {
        let transcript = Transcript::new();
        let messages = assemble(&transcript);
        assert_eq!(messages[0].role, PromptRole::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn sequence_length_is_one_plus_transcript_length() {
        let mut transcript = Transcript::new();
        assert_eq!(assemble(&transcript).len(), 2);

        transcript.push(Turn::user("How is a brain tumor diagnosed?"));
        transcript.push(Turn::assistant("Usually via imaging such as MRI."));
        assert_eq!(assemble(&transcript).len(), 4);
    }

    #[test]
    fn turns_map_in_order_with_content_verbatim() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("  spaced question  "));
        transcript.push(Turn::assistant("<think>checking</think>An answer."));

        let messages = assemble(&transcript);
        assert_eq!(messages[1].role, PromptRole::Ai); // seeded greeting
        assert_eq!(messages[2].role, PromptRole::Human);
        assert_eq!(messages[2].content, "  spaced question  ");
        // Reasoning markup is not stripped by the assembler
        assert_eq!(messages[3].role, PromptRole::Ai);
        assert_eq!(messages[3].content, "<think>checking</think>An answer.");
    }
}
