//! Tiller TUI - Display surfaces for the tiller agent
//!
//! Two [`DisplaySurface`](tiller_conductor::DisplaySurface) implementations
//! for the headless Conductor:
//!
//! - **Terminal UI**: full-screen ratatui interface. [`TuiSurface`] is handed
//!   to the Conductor task; [`App`] runs the event loop on the main task.
//! - **Console**: [`ConsoleSurface`], line-oriented stdio for single-shot
//!   prompts and plain sessions.
//!
//! # Modules
//!
//! - **state**: UI session state machine (pure, no I/O)
//! - **markdown**: assistant text to styled, wrapped lines
//! - **render**: frame layout and widgets
//! - **theme**: the style set every renderer draws with

pub mod app;
pub mod console;
pub mod markdown;
pub mod render;
pub mod state;
pub mod surface;
pub mod theme;

pub use app::App;
pub use console::ConsoleSurface;
pub use markdown::{MarkdownRenderer, RenderError};
pub use state::{Effect, UiEvent, UiState};
pub use surface::{CoreEvent, TuiChannels, TuiSurface};
pub use theme::Theme;
