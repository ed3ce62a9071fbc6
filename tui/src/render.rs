//! Frame Rendering
//!
//! Draws a [`UiState`] into a ratatui frame. Rendering only reads state.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ message log                  │  Min(1)
//! │                              │
//! ├──────────────────────────────┤
//! │ ⣾ Waiting for response...    │  status, 1 row
//! ╭──────────────────────────────╮
//! │ > input                      │  input, 3 rows
//! ╰──────────────────────────────╯
//! ```

use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::state::UiState;

pub const INPUT_PLACEHOLDER: &str = "Type your message here...";

const INPUT_HEIGHT: u16 = 3;

pub fn draw(frame: &mut Frame, state: &UiState) {
    let [log_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
    ])
    .areas(frame.area());

    draw_log(frame, state, log_area);
    draw_status(frame, state, status_area);
    draw_input(frame, state, input_area);
}

fn draw_log(frame: &mut Frame, state: &UiState, area: Rect) {
    let lines = state.visible_lines(usize::from(area.height)).to_vec();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_status(frame: &mut Frame, state: &UiState, area: Rect) {
    let theme = state.theme();
    let mut spans = Vec::new();
    if let Some(frame_char) = state.spinner() {
        spans.push(Span::styled(format!("{frame_char} "), theme.spinner));
    }
    spans.push(Span::styled(state.status_text(), theme.status));
    if state.scroll_offset() > 0 {
        spans.push(Span::styled(
            format!(" [^{} lines - PgDn to scroll]", state.scroll_offset()),
            theme.status,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input(frame: &mut Frame, state: &UiState, area: Rect) {
    let theme = state.theme();
    let enabled = state.input_enabled();

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(if enabled {
            theme.border
        } else {
            theme.border_disabled
        });
    let inner = block.inner(area);

    let text = if state.input().is_empty() {
        Line::from(Span::styled(INPUT_PLACEHOLDER, theme.placeholder))
    } else {
        let visible = tail_fitting(state.input(), usize::from(inner.width.saturating_sub(1)));
        let style = if enabled {
            theme.input
        } else {
            theme.input_disabled
        };
        Line::from(Span::styled(visible.to_string(), style))
    };

    frame.render_widget(Paragraph::new(text).block(block), area);

    if enabled && inner.width > 0 && inner.height > 0 {
        let typed = if state.input().is_empty() {
            0
        } else {
            tail_fitting(state.input(), usize::from(inner.width.saturating_sub(1))).width()
        };
        let offset = u16::try_from(typed).unwrap_or(inner.width).min(inner.width - 1);
        frame.set_cursor_position(Position::new(inner.x + offset, inner.y));
    }
}

/// Longest suffix of `text` no wider than `width` columns
fn tail_fitting(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}
