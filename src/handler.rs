use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick();
            poll_reply(app).await;
            poll_backend_probe(app).await;
        }
    }
    Ok(())
}

/// Check the in-flight model call and finish the cycle when it resolves.
/// The raw reply (reasoning markup included) goes into the transcript; a
/// failure only surfaces on the status line, leaving the user turn dangling.
async fn poll_reply(app: &mut App) {
    let finished = app
        .reply_task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    if let Some(task) = app.reply_task.take() {
        match task.await {
            Ok(Ok(raw)) => {
                app.session.response_received(raw);
                app.reset_reveal();
                app.status = None;
            }
            Ok(Err(err)) => {
                app.session.response_failed();
                app.status = Some(format!("Model call failed: {err}"));
            }
            Err(err) => {
                app.session.response_failed();
                app.status = Some(format!("Model task aborted: {err}"));
            }
        }
    }
}

/// Resolve the startup `/api/tags` probe. Warns when the backend is down or
/// the configured model has not been pulled yet; stays quiet otherwise.
async fn poll_backend_probe(app: &mut App) {
    let finished = app
        .models_task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    if let Some(task) = app.models_task.take() {
        match task.await {
            Ok(Ok(models)) => {
                let model = app.config.model();
                if !models.iter().any(|m| m == model) {
                    app.status = Some(format!(
                        "Model {model} not found. Pull it with: ollama pull {model}"
                    ));
                }
            }
            Ok(Err(err)) => {
                app.status = Some(format!("{err}"));
            }
            Err(_) => {}
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        // Cycle focus: Suggestions -> Chat -> Input
        KeyCode::Tab => match app.focus {
            FocusPane::Suggestions => app.focus = FocusPane::Chat,
            FocusPane::Chat => {
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
            }
            FocusPane::Input => app.focus = FocusPane::Suggestions,
        },

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Suggestions => app.suggestions_nav_down(),
            _ => app.scroll_chat_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Suggestions => app.suggestions_nav_up(),
            _ => app.scroll_chat_up(),
        },
        KeyCode::Char('g') => {
            app.chat_scroll = 0;
            app.follow = false;
        }
        KeyCode::Char('G') => {
            app.scroll_chat_to_bottom();
            app.follow = true;
        }

        // Toggle the reasoning region of assistant replies
        KeyCode::Char('t') => app.show_thinking = !app.show_thinking,

        // A suggestion submits exactly like typing its text
        KeyCode::Enter => {
            if app.focus == FocusPane::Suggestions {
                if let Some(text) = app.selected_suggestion() {
                    submit(app, text.to_string());
                }
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Suggestions;
        }
        KeyCode::Enter => {
            // Only drain the input box once the submit is sure to be
            // accepted; a refused submit must not discard typed text
            if !app.input.is_empty() && app.reply_task.is_none() && !app.session.is_busy() {
                let text = std::mem::take(&mut app.input);
                app.cursor = 0;
                submit(app, text);
            }
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Suggestions;
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Begin one request cycle. Refused by the session while a previous cycle is
/// still in flight, so typing Enter twice cannot overlap model calls.
fn submit(app: &mut App, text: String) {
    if app.reply_task.is_some() {
        return;
    }

    if let Some(messages) = app.session.submit(&text) {
        app.status = None;
        app.follow = true;
        app.scroll_chat_to_bottom();

        let ollama = app.ollama.clone();
        let model = app.config.model().to_string();
        let temperature = app.config.temperature();
        app.reply_task = Some(tokio::spawn(async move {
            ollama.chat(&model, &messages, temperature).await
        }));
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_suggestions = app
        .suggestions_area
        .map(|r| point_in_rect(x, y, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down();
                app.scroll_chat_down();
                app.scroll_chat_down();
            } else if in_suggestions {
                app.suggestions_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up();
                app.scroll_chat_up();
                app.scroll_chat_up();
            } else if in_suggestions {
                app.suggestions_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn typed_input_survives_a_refused_submit() {
        let mut app = App::new(Config::default());
        app.session.submit("first question");
        assert!(app.session.is_busy());

        app.input = "second question".to_string();
        app.cursor = app.input.chars().count();
        handle_editing_mode(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        // The cycle in flight refuses the submit, but the typed text stays
        assert_eq!(app.session.transcript().len(), 2);
        assert_eq!(app.input, "second question");
        assert_eq!(app.cursor, "second question".chars().count());
    }

    #[test]
    fn char_to_byte_index_handles_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 5), s.len());
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }

    #[test]
    fn point_in_rect_excludes_edges_past_extent() {
        let rect = Rect::new(2, 2, 4, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 4, rect));
        assert!(!point_in_rect(6, 4, rect));
        assert!(!point_in_rect(2, 5, rect));
    }
}
