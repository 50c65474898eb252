use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::state::ViewerState;
use crate::config::config::DisplayConfig;
use crate::utils::logging::LogEntry;

/// What the status line needs to know about the dispatcher
pub struct KeyIndicator<'a> {
    pub prefix: &'a str,
    pub armed: bool,
    pub last_key: Option<&'a str>,
}

pub fn draw(
    frame: &mut Frame,
    state: &ViewerState,
    indicator: &KeyIndicator<'_>,
    logs: &[LogEntry],
    display: &DisplayConfig,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(log_panel_height(display.log_lines)),
        ])
        .split(frame.area());

    draw_page(frame, chunks[0], state, display);
    draw_status(frame, chunks[1], state, indicator, display);
    draw_logs(frame, chunks[2], logs);

    if state.dialog.open {
        draw_dialog(frame, centered(chunks[0], 80, 70), state);
    }
}

fn draw_page(frame: &mut Frame, area: Rect, state: &ViewerState, display: &DisplayConfig) {
    let page_icon = if display.use_glyphs { "📄 " } else { "" };
    let lines = vec![
        Line::from(vec![
            Span::raw(page_icon),
            Span::styled(
                format!("Page {} / {}", state.current_page, state.pages),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!("Fit: {}", state.fit_mode)),
        Line::from(""),
        Line::from(Span::styled(
            "↑/↓ page  0-9 jump  ctrl+x m markdown  ctrl+x f fit  tab focus  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let title = if state.input_focused {
        " Document (input focused) "
    } else {
        " Document "
    };
    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn draw_status(
    frame: &mut Frame,
    area: Rect,
    state: &ViewerState,
    indicator: &KeyIndicator<'_>,
    display: &DisplayConfig,
) {
    let mut spans = Vec::new();
    if display.show_key_indicator {
        if indicator.armed {
            spans.push(Span::styled(
                format!(" {} … ", indicator.prefix),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ));
        }
        if let Some(key) = indicator.last_key {
            spans.push(Span::styled(
                format!(" {} ", key),
                Style::default().fg(Color::Cyan),
            ));
        }
    }
    if state.page_input.is_pending() {
        spans.push(Span::raw(format!(" go to {} ", state.page_input.pending())));
    }
    if let Some(status) = &state.status {
        spans.push(Span::raw(format!(" {}", status)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_logs(frame: &mut Frame, area: Rect, logs: &[LogEntry]) {
    let lines: Vec<Line> = logs
        .iter()
        .map(|entry| Line::from(entry.format_for_display()))
        .collect();
    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Log "));
    frame.render_widget(paragraph, area);
}

fn draw_dialog(frame: &mut Frame, area: Rect, state: &ViewerState) {
    let dialog = &state.dialog;
    let body = if dialog.converting {
        "Preparing conversion...".to_string()
    } else {
        dialog
            .markdown
            .clone()
            .unwrap_or_else(|| "No markdown available for this document.".to_string())
    };

    let footer = if dialog.can_export() {
        "ctrl+x c copy  ctrl+x s save  esc close"
    } else {
        "esc close"
    };

    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Markdown ")
                .title_bottom(footer),
        );
    frame.render_widget(paragraph, area);
}

/// Log lines plus the block borders, clamped to what a terminal can show
fn log_panel_height(log_lines: usize) -> u16 {
    u16::try_from(log_lines).unwrap_or(u16::MAX).saturating_add(2)
}

/// A rectangle of the given percentage size centered in `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::ViewerConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(state: &ViewerState, armed: bool) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let indicator = KeyIndicator {
            prefix: "ctrl+x",
            armed,
            last_key: Some("Ctrl+x"),
        };
        terminal
            .draw(|f| draw(f, state, &indicator, &[], &DisplayConfig::default()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_renders_page_and_armed_prefix() {
        let state = ViewerState::new(12, &ViewerConfig::default());
        let screen = render(&state, true);
        assert!(screen.contains("Page 1 / 12"));
        assert!(screen.contains("ctrl+x …"));
    }

    #[test]
    fn test_renders_dialog_when_open() {
        let mut state = ViewerState::new(3, &ViewerConfig::default());
        state.dialog.open = true;
        let screen = render(&state, false);
        assert!(screen.contains("Markdown"));
        assert!(screen.contains("No markdown available"));
    }

    #[test]
    fn test_oversized_log_panel_is_clamped() {
        assert_eq!(log_panel_height(5), 7);
        assert_eq!(log_panel_height(65535), u16::MAX);
        assert_eq!(log_panel_height(usize::MAX), u16::MAX);

        let state = ViewerState::new(2, &ViewerConfig::default());
        let display = DisplayConfig {
            log_lines: 65535,
            ..DisplayConfig::default()
        };
        let indicator = KeyIndicator {
            prefix: "ctrl+x",
            armed: false,
            last_key: None,
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &state, &indicator, &[], &display))
            .unwrap();
    }
}
