use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::reply::ParsedReply;
use crate::session::Session;
use crate::transcript::Role;

/// Pre-authored questions offered above the chat.
pub const SUGGESTIONS: [&str; 5] = [
    "What are the early symptoms of a brain tumor?",
    "How is a brain tumor diagnosed?",
    "What are the treatment options for brain tumors?",
    "Can a brain tumor be non-cancerous?",
    "What lifestyle changes can help manage brain tumors?",
];

/// How many characters of the newest answer appear per tick.
const REVEAL_CHARS_PER_TICK: usize = 2;

/// Ellipsis animation advances once per this many ticks.
const ELLIPSIS_TICK_DIVISOR: u64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Suggestions,
    Chat,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation state
    pub session: Session,
    pub reply_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,

    // Startup backend probe
    pub models_task: Option<tokio::task::JoinHandle<anyhow::Result<Vec<String>>>>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Suggestions state
    pub suggestions_state: ListState,

    // Chat display state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    pub total_chat_lines: u16,
    pub follow: bool, // Stick to the bottom while content grows
    pub show_thinking: bool,

    // Animation state
    pub revealed: usize, // Chars of the newest assistant answer shown so far
    pub animation_frame: u8, // 0-2 for ellipsis animation
    tick_count: u64,

    // Status line (backend availability, model-call failures)
    pub status: Option<String>,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub suggestions_area: Option<Rect>,

    // Backend
    pub ollama: OllamaClient,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let ollama = OllamaClient::new(config.base_url());

        let mut suggestions_state = ListState::default();
        suggestions_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            session: Session::new(),
            reply_task: None,

            models_task: None,

            input: String::new(),
            cursor: 0,

            suggestions_state,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            total_chat_lines: 0,
            follow: true,
            show_thinking: false,

            revealed: 0,
            animation_frame: 0,
            tick_count: 0,

            status: None,

            chat_area: None,
            suggestions_area: None,

            ollama,
            config,
        }
    }

    /// Advance time-driven presentation state. Runs on every Tick event and
    /// never touches the transcript.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);

        if self.session.is_busy() {
            if self.tick_count % ELLIPSIS_TICK_DIVISOR == 0 {
                self.animation_frame = (self.animation_frame + 1) % 3;
            }
            return;
        }

        // Typing reveal of the newest assistant answer
        let remaining = self.reveal_target().saturating_sub(self.revealed);
        if remaining > 0 {
            self.revealed += remaining.min(REVEAL_CHARS_PER_TICK);
            self.follow = true;
        }
    }

    /// Char count of the answer segment of the newest assistant turn.
    fn reveal_target(&self) -> usize {
        match self.session.transcript().last() {
            Some(turn) if turn.role == Role::Assistant => {
                ParsedReply::parse(&turn.content).answer.chars().count()
            }
            _ => 0,
        }
    }

    /// Restart the typing reveal, called when a new assistant turn lands.
    pub fn reset_reveal(&mut self) {
        self.revealed = 0;
        self.follow = true;
    }

    pub fn scroll_chat_down(&mut self) {
        let max_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
        self.follow = self.chat_scroll >= max_scroll;
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
        self.follow = false;
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
    }

    // Suggestions navigation
    pub fn suggestions_nav_down(&mut self) {
        let len = SUGGESTIONS.len();
        let i = self.suggestions_state.selected().unwrap_or(0);
        self.suggestions_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn suggestions_nav_up(&mut self) {
        let i = self.suggestions_state.selected().unwrap_or(0);
        self.suggestions_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_suggestion(&self) -> Option<&'static str> {
        self.suggestions_state
            .selected()
            .and_then(|i| SUGGESTIONS.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(Config::default())
    }

    #[test]
    fn greeting_types_out_from_the_start() {
        let mut app = test_app();
        assert_eq!(app.revealed, 0);
        app.tick();
        assert!(app.revealed > 0);

        for _ in 0..1000 {
            app.tick();
        }
        // Reveal stops at the greeting length
        assert_eq!(app.revealed, crate::transcript::GREETING.chars().count());
    }

    #[test]
    fn ellipsis_animates_only_while_busy() {
        let mut app = test_app();
        for _ in 0..20 {
            app.tick();
        }
        assert_eq!(app.animation_frame, 0);

        app.session.submit("What is a migraine?");
        let mut saw_animation = false;
        for _ in 0..20 {
            app.tick();
            if app.animation_frame != 0 {
                saw_animation = true;
            }
        }
        assert!(saw_animation);
    }

    #[test]
    fn new_reply_restarts_the_reveal() {
        let mut app = test_app();
        for _ in 0..1000 {
            app.tick();
        }

        app.session.submit("What is a migraine?");
        app.session.response_received("A headache disorder.");
        app.reset_reveal();
        assert_eq!(app.revealed, 0);

        app.tick();
        assert!(app.revealed > 0);
    }

    #[test]
    fn selected_suggestion_follows_navigation() {
        let mut app = test_app();
        assert_eq!(app.selected_suggestion(), Some(SUGGESTIONS[0]));
        app.suggestions_nav_down();
        assert_eq!(app.selected_suggestion(), Some(SUGGESTIONS[1]));
        app.suggestions_nav_up();
        app.suggestions_nav_up();
        assert_eq!(app.selected_suggestion(), Some(SUGGESTIONS[0]));
    }
}
