//! UI Session State
//!
//! The terminal UI's own state machine. It is owned by the UI task and only
//! changes through [`UiState::handle`]; the Conductor never touches it.
//! Side effects the event loop must carry out are returned as [`Effect`]s so
//! the transitions stay synchronous and testable.

use std::mem;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use tiller_conductor::{Message, MessageKind};

use crate::markdown::{MarkdownRenderer, MIN_WRAP_WIDTH};
use crate::theme::Theme;

/// Maximum characters the input field accepts
pub const INPUT_CHAR_LIMIT: usize = 1000;

/// Spinner frame interval
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Braille spinner frames
pub const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Rows taken by the status line and the input box
const CHROME_HEIGHT: u16 = 4;

/// Columns reserved around wrapped message text
const WRAP_MARGIN: u16 = 10;

/// Everything that can change UI state
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    Resize { width: u16, height: u16 },
    Key(KeyEvent),
    MessageReceived(Message),
    InputRequested,
    Tick,
}

/// Work the event loop performs after a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Hand the text to the pending input request
    Submit(String),
    /// Arm the next spinner tick
    ScheduleTick,
    /// Leave the event loop
    Quit,
}

/// Terminal geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn log_height(&self) -> u16 {
        self.height.saturating_sub(CHROME_HEIGHT)
    }

    pub fn wrap_width(&self) -> usize {
        usize::from(self.width.saturating_sub(WRAP_MARGIN))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

pub struct UiState {
    accepting_input: bool,
    awaiting_response: bool,
    tool_in_progress: bool,
    active_tool: Option<String>,
    /// The Conductor is blocked on the input channel
    input_requested: bool,
    input: String,
    log: Vec<Line<'static>>,
    /// Lines scrolled up from the bottom (0 = latest)
    scroll_offset: usize,
    viewport: Viewport,
    spinner_frame: usize,
    ticking: bool,
    renderer: MarkdownRenderer,
    theme: Theme,
    preview_chars: usize,
}

impl UiState {
    pub fn new(theme: Theme, preview_chars: usize) -> Self {
        let viewport = Viewport::default();
        Self {
            accepting_input: false,
            awaiting_response: false,
            tool_in_progress: false,
            active_tool: None,
            input_requested: false,
            input: String::new(),
            log: Vec::new(),
            scroll_offset: 0,
            viewport,
            spinner_frame: 0,
            ticking: false,
            renderer: MarkdownRenderer::new(viewport.wrap_width(), theme.clone()),
            theme,
            preview_chars,
        }
    }

    /// Apply one event and return the follow-up work
    pub fn handle(&mut self, event: UiEvent) -> Vec<Effect> {
        match event {
            UiEvent::Resize { width, height } => {
                self.resize(width, height);
                Vec::new()
            }
            UiEvent::Key(key) => self.on_key(key),
            UiEvent::MessageReceived(message) => self.on_message(message),
            UiEvent::InputRequested => {
                self.input_requested = true;
                self.accepting_input = true;
                self.awaiting_response = false;
                self.tool_in_progress = false;
                self.active_tool = None;
                self.input.clear();
                Vec::new()
            }
            UiEvent::Tick => self.on_tick(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors used by rendering
    // ------------------------------------------------------------------

    pub fn accepting_input(&self) -> bool {
        self.accepting_input
    }

    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn tool_in_progress(&self) -> bool {
        self.tool_in_progress
    }

    pub fn active_tool(&self) -> Option<&str> {
        self.active_tool.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn log(&self) -> &[Line<'static>] {
        &self.log
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// A turn is in flight
    pub fn is_busy(&self) -> bool {
        self.awaiting_response || self.tool_in_progress
    }

    /// Whether keystrokes edit the input field
    pub fn input_enabled(&self) -> bool {
        self.accepting_input && !self.is_busy()
    }

    /// Current spinner frame while busy
    pub fn spinner(&self) -> Option<&'static str> {
        self.is_busy()
            .then(|| SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()])
    }

    pub fn status_text(&self) -> String {
        if self.tool_in_progress {
            format!(
                "Processing tool: {}",
                self.active_tool.as_deref().unwrap_or("unknown")
            )
        } else if self.awaiting_response {
            "Waiting for response...".to_string()
        } else {
            "Press Esc or Ctrl+C to quit".to_string()
        }
    }

    /// Log lines that fit in `height` rows at the current scroll position
    pub fn visible_lines(&self, height: usize) -> &[Line<'static>] {
        let end = self.log.len() - self.scroll_offset.min(self.log.len());
        let start = end.saturating_sub(height);
        &self.log[start..end]
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        self.renderer.set_wrap_width(self.viewport.wrap_width());
        tracing::debug!(width, height, "Viewport resized");
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return vec![Effect::Quit],
            KeyCode::Char('c') if ctrl => return vec![Effect::Quit],
            _ => {}
        }

        if !self.input_enabled() {
            return match key.code {
                KeyCode::Char('q') => vec![Effect::Quit],
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
                Vec::new()
            }
            KeyCode::PageUp => {
                let page = self.page_size();
                let max_scroll = self.log.len().saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page).min(max_scroll);
                Vec::new()
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size());
                Vec::new()
            }
            KeyCode::Char(c) if !ctrl => {
                if self.input.chars().count() < INPUT_CHAR_LIMIT {
                    self.input.push(c);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.input.trim().is_empty() || !self.input_requested {
            return Vec::new();
        }

        let text = mem::take(&mut self.input);
        self.accepting_input = false;
        self.input_requested = false;
        self.awaiting_response = true;
        self.scroll_offset = 0;

        let mut effects = vec![Effect::Submit(text)];
        effects.extend(self.start_ticker());
        effects
    }

    fn on_message(&mut self, message: Message) -> Vec<Effect> {
        let theme = self.theme.clone();
        match message.kind {
            MessageKind::UserInput => {
                self.push_labeled("You", theme.user, &message.content, theme.user);
                Vec::new()
            }
            MessageKind::Assistant => {
                self.push_assistant(&message.content);
                self.awaiting_response = false;
                self.accepting_input = true;
                Vec::new()
            }
            MessageKind::ToolCall => {
                let name = message
                    .tool_call_data()
                    .map_or(message.content.clone(), |call| call.tool_name);
                self.push_labeled("Tool", theme.tool, &format!("Executing {name}"), theme.tool);
                self.tool_in_progress = true;
                self.active_tool = Some(name);
                self.start_ticker().into_iter().collect()
            }
            MessageKind::ToolResult => {
                let name = message
                    .tool_result_data()
                    .map_or_else(|| "tool".to_string(), |result| result.tool_name);
                let preview = truncate_preview(&message.content, self.preview_chars);
                let style = if message.is_error() {
                    theme.error
                } else {
                    theme.tool_result
                };
                self.push_labeled("Tool", theme.tool, &format!("{name}: {preview}"), style);
                self.tool_in_progress = false;
                self.active_tool = None;
                self.awaiting_response = true;
                self.start_ticker().into_iter().collect()
            }
            MessageKind::Error => {
                self.push_labeled("Error", theme.error, &message.content, theme.error);
                self.awaiting_response = false;
                self.tool_in_progress = false;
                self.active_tool = None;
                self.accepting_input = true;
                Vec::new()
            }
            MessageKind::SystemInfo => {
                self.push_labeled("System", theme.system, &message.content, theme.system);
                Vec::new()
            }
        }
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        if self.is_busy() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            vec![Effect::ScheduleTick]
        } else {
            self.ticking = false;
            Vec::new()
        }
    }

    fn start_ticker(&mut self) -> Option<Effect> {
        if self.ticking {
            return None;
        }
        self.ticking = true;
        Some(Effect::ScheduleTick)
    }

    fn page_size(&self) -> usize {
        usize::from(self.viewport.log_height() / 2).max(1)
    }

    // ------------------------------------------------------------------
    // Log rendering
    // ------------------------------------------------------------------

    fn push_assistant(&mut self, content: &str) {
        let stamp = format!("[{}] ", timestamp());
        self.log.push(Line::from(vec![
            Span::styled(stamp, self.theme.timestamp),
            Span::styled("Assistant:", self.theme.assistant_label),
        ]));

        match self.renderer.render(content) {
            Ok(lines) => self.log.extend(lines),
            Err(e) => {
                tracing::debug!(error = %e, "Markdown render failed, using plain text");
                let width = self.viewport.wrap_width().max(1);
                for row in textwrap::wrap(content, width) {
                    self.log
                        .push(Line::from(Span::styled(row.into_owned(), self.theme.assistant)));
                }
            }
        }
    }

    fn push_labeled(&mut self, label: &str, label_style: Style, content: &str, style: Style) {
        let stamp = format!("[{}] ", timestamp());
        let head = format!("{label}: ");
        let indent = " ".repeat(stamp.width() + head.width());
        let width = self.viewport.wrap_width().max(MIN_WRAP_WIDTH) + indent.len();

        let options = textwrap::Options::new(width)
            .initial_indent(&indent)
            .subsequent_indent(&indent);
        let rows = textwrap::wrap(content, options);

        for (i, row) in rows.iter().enumerate() {
            let body = row.strip_prefix(indent.as_str()).unwrap_or(&row[..]).to_string();
            let line = if i == 0 {
                Line::from(vec![
                    Span::styled(stamp.clone(), self.theme.timestamp),
                    Span::styled(head.clone(), label_style),
                    Span::styled(body, style),
                ])
            } else {
                Line::from(vec![Span::raw(indent.clone()), Span::styled(body, style)])
            };
            self.log.push(line);
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Shorten display text to `max` characters plus an ellipsis
pub fn truncate_preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tiller_conductor::{ToolCallData, ToolResultData};

    fn state() -> UiState {
        UiState::new(Theme::default(), 200)
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn type_text(state: &mut UiState, text: &str) {
        for c in text.chars() {
            state.handle(key(KeyCode::Char(c)));
        }
    }

    fn tool_call(name: &str) -> Message {
        Message::tool_call(&ToolCallData {
            tool_name: name.to_string(),
            tool_id: "t1".to_string(),
            input: serde_json::json!({}),
        })
    }

    fn tool_result(name: &str, result: &str, is_error: bool) -> Message {
        Message::tool_result(&ToolResultData {
            tool_name: name.to_string(),
            tool_id: "t1".to_string(),
            result: result.to_string(),
            is_error,
        })
    }

    #[test]
    fn test_keys_ignored_until_input_requested() {
        let mut s = state();
        type_text(&mut s, "hi");
        assert_eq!(s.input(), "");
        assert!(!s.input_enabled());
    }

    #[test]
    fn test_submit_flow() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        assert!(s.input_enabled());

        type_text(&mut s, "hello");
        assert_eq!(s.input(), "hello");

        let effects = s.handle(key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![Effect::Submit("hello".to_string()), Effect::ScheduleTick]
        );
        assert_eq!(s.input(), "");
        assert!(s.awaiting_response());
        assert!(!s.accepting_input());
        assert_eq!(s.spinner(), Some(SPINNER_FRAMES[0]));
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        type_text(&mut s, "   ");
        assert!(s.handle(key(KeyCode::Enter)).is_empty());
        assert!(!s.awaiting_response());
    }

    #[test]
    fn test_keys_ignored_while_awaiting() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        type_text(&mut s, "a");
        s.handle(key(KeyCode::Enter));

        type_text(&mut s, "xyz");
        assert_eq!(s.input(), "");
        assert!(s.handle(key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_q_quits_only_when_not_accepting() {
        let mut s = state();
        assert_eq!(s.handle(key(KeyCode::Char('q'))), vec![Effect::Quit]);

        s.handle(UiEvent::InputRequested);
        assert!(s.handle(key(KeyCode::Char('q'))).is_empty());
        assert_eq!(s.input(), "q");
    }

    #[test]
    fn test_quit_keys_always_work() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        assert_eq!(s.handle(key(KeyCode::Esc)), vec![Effect::Quit]);
        let ctrl_c = UiEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(s.handle(ctrl_c), vec![Effect::Quit]);
    }

    #[test]
    fn test_backspace_and_char_limit() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        type_text(&mut s, &"x".repeat(INPUT_CHAR_LIMIT + 5));
        assert_eq!(s.input().chars().count(), INPUT_CHAR_LIMIT);

        s.handle(key(KeyCode::Backspace));
        assert_eq!(s.input().chars().count(), INPUT_CHAR_LIMIT - 1);
    }

    #[test]
    fn test_tool_call_and_result_flags() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        type_text(&mut s, "go");
        s.handle(key(KeyCode::Enter));

        let effects = s.handle(UiEvent::MessageReceived(tool_call("read_file")));
        assert!(effects.is_empty(), "ticker already running");
        assert!(s.tool_in_progress());
        assert_eq!(s.active_tool(), Some("read_file"));
        assert_eq!(s.status_text(), "Processing tool: read_file");
        assert!(line_text(s.log().last().unwrap()).ends_with("Tool: Executing read_file"));

        s.handle(UiEvent::MessageReceived(tool_result("read_file", "contents", false)));
        assert!(!s.tool_in_progress());
        assert_eq!(s.active_tool(), None);
        assert!(s.awaiting_response());
        assert_eq!(s.status_text(), "Waiting for response...");
        assert!(line_text(s.log().last().unwrap()).ends_with("Tool: read_file: contents"));
    }

    #[test]
    fn test_tool_result_error_style_and_truncation() {
        let mut s = UiState::new(Theme::default(), 10);
        let long = "abcdefghijklmnopqrstuvwxyz";
        s.handle(UiEvent::MessageReceived(tool_result("bash", long, true)));

        let line = s.log().last().unwrap();
        assert!(line_text(line).ends_with("bash: abcdefghij..."));
        assert_eq!(line.spans.last().unwrap().style, Theme::default().error);
    }

    #[test]
    fn test_assistant_reenters_accepting() {
        let mut s = state();
        s.handle(UiEvent::InputRequested);
        type_text(&mut s, "hi");
        s.handle(key(KeyCode::Enter));

        s.handle(UiEvent::MessageReceived(Message::assistant("**Hello** there")));
        assert!(!s.awaiting_response());
        assert!(s.accepting_input());

        let texts: Vec<String> = s.log().iter().map(line_text).collect();
        assert!(texts.iter().any(|t| t.ends_with("Assistant:")));
        assert!(texts.iter().any(|t| t == "Hello there"));
    }

    #[test]
    fn test_assistant_plain_fallback_on_narrow_terminal() {
        let mut s = state();
        s.handle(UiEvent::Resize {
            width: 20,
            height: 10,
        });
        s.handle(UiEvent::MessageReceived(Message::assistant("# hi")));
        let texts: Vec<String> = s.log().iter().map(line_text).collect();
        assert_eq!(texts.last().map(String::as_str), Some("# hi"));
    }

    #[test]
    fn test_error_clears_busy_flags() {
        let mut s = state();
        s.handle(UiEvent::MessageReceived(tool_call("bash")));
        s.handle(UiEvent::MessageReceived(Message::error("API error (500): boom")));
        assert!(!s.is_busy());
        assert!(s.accepting_input());
        let last = s.log().last().unwrap();
        assert!(line_text(last).contains("Error: API error (500): boom"));
    }

    #[test]
    fn test_tick_advances_only_while_busy() {
        let mut s = state();
        s.handle(UiEvent::MessageReceived(tool_call("bash")));
        assert!(s.is_ticking());

        assert_eq!(s.handle(UiEvent::Tick), vec![Effect::ScheduleTick]);
        assert_eq!(s.spinner(), Some(SPINNER_FRAMES[1]));

        s.handle(UiEvent::InputRequested);
        assert!(s.handle(UiEvent::Tick).is_empty());
        assert!(!s.is_ticking());
        assert_eq!(s.spinner(), None);
    }

    #[test]
    fn test_input_requested_clears_buffer() {
        let mut s = state();
        s.handle(UiEvent::MessageReceived(Message::assistant("hi")));
        type_text(&mut s, "draft");
        s.handle(UiEvent::InputRequested);
        assert_eq!(s.input(), "");
    }

    #[test]
    fn test_resize_updates_wrap_width_only() {
        let mut s = state();
        s.handle(UiEvent::MessageReceived(Message::system_info("hello")));
        let before = s.log().to_vec();

        s.handle(UiEvent::Resize {
            width: 120,
            height: 40,
        });
        assert_eq!(s.viewport().wrap_width(), 110);
        assert_eq!(s.viewport().log_height(), 36);
        assert_eq!(s.log(), before.as_slice());
    }

    #[test]
    fn test_scrolling() {
        let mut s = state();
        for i in 0..50 {
            s.handle(UiEvent::MessageReceived(Message::system_info(format!("line {i}"))));
        }
        s.handle(UiEvent::InputRequested);

        s.handle(key(KeyCode::PageUp));
        assert_eq!(s.scroll_offset(), 10);
        let visible = s.visible_lines(5);
        assert!(line_text(visible.last().unwrap()).ends_with("line 39"));

        s.handle(key(KeyCode::PageDown));
        assert_eq!(s.scroll_offset(), 0);
    }

    #[test]
    fn test_user_input_line() {
        let mut s = state();
        s.handle(UiEvent::MessageReceived(Message::user_input("what's up")));
        let text = line_text(s.log().last().unwrap());
        assert!(text.starts_with('['));
        assert!(text.ends_with("] You: what's up"));
    }

    #[test]
    fn test_truncate_preview_char_boundary() {
        assert_eq!(truncate_preview("short", 10), "short");
        assert_eq!(truncate_preview("ééééé", 3), "ééé...");
        assert_eq!(truncate_preview("exact", 5), "exact");
    }
}
