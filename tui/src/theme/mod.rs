//! Theme and Colors
//!
//! Palette and the [`Theme`] style set used by every rendering routine.
//!
//! A `Theme` is built once when the surface starts and passed explicitly to
//! renderers; nothing here is process-wide mutable state.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Palette
// ============================================================================

/// Accent for assistant text and headings
pub const ACCENT: Color = Color::Rgb(130, 170, 255);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Tool activity amber
pub const TOOL_AMBER: Color = Color::Rgb(240, 190, 90);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Inline and block code
pub const CODE_TEAL: Color = Color::Rgb(120, 210, 200);

/// Border when the input is live
pub const BORDER_ACTIVE: Color = Color::Rgb(170, 120, 255);

// ============================================================================
// Theme
// ============================================================================

/// Every style the terminal UI draws with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub timestamp: Style,
    pub user: Style,
    pub assistant_label: Style,
    pub assistant: Style,
    pub tool: Style,
    pub tool_result: Style,
    pub error: Style,
    pub system: Style,
    pub status: Style,
    pub spinner: Style,
    pub input: Style,
    pub input_disabled: Style,
    pub placeholder: Style,
    pub border: Style,
    pub border_disabled: Style,
    pub heading: Style,
    pub code: Style,
    pub quote: Style,
    pub list_bullet: Style,
    pub link: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            timestamp: Style::default().fg(DIM_GRAY),
            user: Style::default().fg(USER_GREEN),
            assistant_label: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            assistant: Style::default(),
            tool: Style::default().fg(TOOL_AMBER),
            tool_result: Style::default().fg(DIM_GRAY),
            error: Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD),
            system: Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            status: Style::default().fg(DIM_GRAY),
            spinner: Style::default().fg(ACCENT),
            input: Style::default(),
            input_disabled: Style::default().fg(DIM_GRAY),
            placeholder: Style::default().fg(DIM_GRAY),
            border: Style::default().fg(BORDER_ACTIVE),
            border_disabled: Style::default().fg(DIM_GRAY),
            heading: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            code: Style::default().fg(CODE_TEAL),
            quote: Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            list_bullet: Style::default().fg(ACCENT),
            link: Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED),
        }
    }
}
