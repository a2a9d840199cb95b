use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, SUGGESTIONS};
use crate::reply::ParsedReply;
use crate::transcript::Role;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_text = String::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        if let Some(close) = after_open.find("**") {
            current_text.push_str(&rest[..open]);
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            let bold_text = &after_open[..close];
            if bold_text.is_empty() {
                current_text.push_str("****");
            } else {
                spans.push(Span::styled(
                    bold_text.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
            rest = &after_open[close + 2..];
        } else {
            // No closing **, treat the rest as literal
            break;
        }
    }

    current_text.push_str(rest);
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, suggestions_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(SUGGESTIONS.len() as u16 + 2),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_suggestions(app, frame, suggestions_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![Span::styled(
        " 🧠 BrainAI ",
        Style::default().fg(Color::Cyan).bold(),
    )]);
    let caption = Line::from(Span::styled(
        " 🚀 Your own AI Neurologist with SuperPowers!!",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Text::from(vec![title, caption])), area);
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    app.suggestions_area = Some(area);

    let focused = app.focus == FocusPane::Suggestions;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" 💡 Common Questions (Enter to ask) ");

    let items: Vec<ListItem> = SUGGESTIONS
        .iter()
        .map(|question| ListItem::new(format!(" {question} ")))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.suggestions_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Ollama: {} ", app.config.model()));

    let mut lines: Vec<Line> = Vec::new();
    let turns = app.session.transcript().turns();

    for (i, turn) in turns.iter().enumerate() {
        let is_last = i + 1 == turns.len();
        match turn.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in turn.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));

                // Parsing happens here, at render time; the transcript keeps
                // the raw reply untouched.
                let parsed = ParsedReply::parse(&turn.content);

                if let Some(reasoning) = &parsed.reasoning {
                    if app.show_thinking {
                        lines.push(Line::from(Span::styled(
                            "🔍 Internal Analysis:",
                            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
                        )));
                        for line in reasoning.lines() {
                            lines.push(Line::from(Span::styled(
                                line.to_string(),
                                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                            )));
                        }
                        lines.push(Line::default());
                    } else {
                        lines.push(Line::from(Span::styled(
                            "[thinking hidden - press t to view]",
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }

                // The newest answer is revealed character by character
                let answer: String = if is_last {
                    parsed.answer.chars().take(app.revealed).collect()
                } else {
                    parsed.answer.clone()
                };
                for line in answer.lines() {
                    lines.push(parse_markdown_line(line));
                }
                lines.push(Line::default());
            }
        }
    }

    if app.session.is_busy() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("🧠 Thinking{dots}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    app.total_chat_lines = wrapped_line_count(&lines, app.chat_width);
    if app.follow {
        app.scroll_chat_to_bottom();
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// Estimate how many rows the chat lines occupy once wrapped, so follow mode
/// can pin the viewport to the bottom.
fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    let wrap_width = if width > 0 { width as usize } else { 50 };
    let mut total: u16 = 0;

    for line in lines {
        // Use character count, not byte length, for proper UTF-8 handling
        let char_count: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
        if char_count == 0 {
            total += 1;
        } else {
            total += ((char_count.saturating_sub(1) / wrap_width) + 1) as u16;
        }
    }

    total
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message . . . ");

    // Horizontal scroll keeps the cursor visible in a single-line input
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_window(&app.input, app.cursor, inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Visible slice of the input and the cursor's column inside it, measured in
/// display cells so wide glyphs (CJK, emoji) keep the terminal cursor under
/// the character being edited.
fn input_window(input: &str, cursor: usize, inner_width: usize) -> (String, u16) {
    use unicode_width::UnicodeWidthChar;

    if inner_width == 0 {
        return (String::new(), 0);
    }

    let widths: Vec<usize> = input.chars().map(|c| c.width().unwrap_or(0)).collect();
    let cursor = cursor.min(widths.len());

    // Walk back from the cursor until the window is full, keeping one cell
    // free so the cursor column itself stays inside the window
    let mut start = cursor;
    let mut used = 0;
    while start > 0 && used + widths[start - 1] < inner_width {
        used += widths[start - 1];
        start -= 1;
    }
    let cursor_x = used as u16;

    let mut visible = String::new();
    let mut filled = 0;
    for (i, c) in input.chars().enumerate().skip(start) {
        if filled + widths[i] > inner_width {
            break;
        }
        filled += widths[i];
        visible.push(c);
    }

    (visible, cursor_x)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // A model failure takes over the whole status line
    if let Some(status) = &app.status {
        let error = Line::from(Span::styled(
            format!(" {status} "),
            Style::default().bg(Color::Red).fg(Color::White),
        ));
        frame.render_widget(Paragraph::new(error), area);
        return;
    }

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" browse ", label_style),
            Span::styled(" Ctrl-C ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" t ", key_style),
            Span::styled(" thinking ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn bold_markdown_becomes_styled_spans() {
        let line = parse_markdown_line("A **bold** word");
        assert_eq!(line_text(&line), "A bold word");
        assert!(line
            .spans
            .iter()
            .any(|s| s.content == "bold" && s.style.add_modifier.contains(Modifier::BOLD)));
    }

    #[test]
    fn unclosed_bold_marker_stays_literal() {
        let line = parse_markdown_line("A **dangling marker");
        assert_eq!(line_text(&line), "A **dangling marker");
    }

    #[test]
    fn input_window_scrolls_to_keep_the_cursor_visible() {
        let input = "x".repeat(20);
        let (visible, cursor_x) = input_window(&input, 20, 10);
        assert_eq!(visible.chars().count(), 9);
        assert_eq!(cursor_x, 9);

        let (visible, cursor_x) = input_window(&input, 0, 10);
        assert_eq!(visible.chars().count(), 10);
        assert_eq!(cursor_x, 0);
    }

    #[test]
    fn wide_glyphs_offset_the_cursor_by_display_width() {
        // Three CJK chars occupy six cells
        let (visible, cursor_x) = input_window("日本語abc", 3, 20);
        assert_eq!(visible, "日本語abc");
        assert_eq!(cursor_x, 6);

        // Window measured in cells, not chars: with one cell kept free for
        // the cursor, a 4-cell window ending at it fits one wide char
        let (visible, cursor_x) = input_window("日本語", 3, 4);
        assert_eq!(visible, "語");
        assert_eq!(cursor_x, 2);
    }

    #[test]
    fn wrapped_line_count_accounts_for_width() {
        let lines = vec![
            Line::from("x".repeat(100)),
            Line::default(),
            Line::from("short"),
        ];
        // 100 chars at width 50 wrap to 2 rows, plus 1 empty, plus 1 short
        assert_eq!(wrapped_line_count(&lines, 50), 4);
    }
}
