use crate::prompt::{self, PromptMessage};
use crate::transcript::{Transcript, Turn};

/// Where the current request cycle stands. Submitted, Parsing and Complete
/// are passed through synchronously inside the event methods; the phases a
/// caller can observe between events are Idle and AwaitingModel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitted,
    AwaitingModel,
    Parsing,
    Complete,
}

/// One conversation session: the transcript plus the request-cycle state
/// machine. Owned by the app, passed by reference into the event handlers —
/// never a process global.
///
/// Cycles are strictly sequential: `submit` is refused until the previous
/// cycle has ended with `response_received` or `response_failed`.
pub struct Session {
    transcript: Transcript,
    phase: Phase,
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            phase: Phase::Idle,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::AwaitingModel
    }

    /// Accept user input (typed or from a suggestion — both land here) and
    /// begin a cycle. Returns the assembled message sequence for the model
    /// call, or None if the input is empty or a cycle is already in flight.
    pub fn submit(&mut self, text: &str) -> Option<Vec<PromptMessage>> {
        if self.phase != Phase::Idle || text.is_empty() {
            return None;
        }

        self.transcript.push(Turn::user(text));
        self.phase = Phase::Submitted;

        let messages = prompt::assemble(&self.transcript);
        self.phase = Phase::AwaitingModel;
        Some(messages)
    }

    /// End the in-flight cycle with the model's raw reply. The unparsed text
    /// is what gets appended; any `<think>` markup stays in the transcript
    /// and is re-parsed at render time.
    pub fn response_received(&mut self, raw: impl Into<String>) {
        if self.phase != Phase::AwaitingModel {
            return;
        }

        self.phase = Phase::Parsing;
        self.transcript.push(Turn::assistant(raw));
        self.phase = Phase::Complete;
        self.phase = Phase::Idle;
    }

    /// End the in-flight cycle after a model failure. The user turn already
    /// appended stays in the transcript, unanswered; there is no rollback or
    /// retry.
    pub fn response_failed(&mut self) {
        if self.phase == Phase::AwaitingModel {
            self.phase = Phase::Idle;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
