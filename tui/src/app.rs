//! Main Application
//!
//! The App owns the terminal side of the session:
//! - waits on terminal events, Conductor events, and the spinner tick
//! - feeds each one through [`UiState`]
//! - carries out the resulting [`Effect`]s and redraws
//!
//! The loop only suspends on those sources; there is no frame timer. The
//! spinner tick is armed on demand and lapses once nothing is in flight.

use std::io;

use crossterm::event::{Event, KeyEventKind};
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{sleep_until, Instant};

use crate::render;
use crate::state::{Effect, UiEvent, UiState, TICK_INTERVAL};
use crate::surface::{CoreEvent, TuiChannels};
use crate::theme::Theme;

/// What woke the event loop
enum Wake {
    Closed,
    Terminal(Option<io::Result<Event>>),
    Core(Option<CoreEvent>),
    Tick,
}

/// Main application state
pub struct App {
    state: UiState,
    channels: TuiChannels,
    /// Deadline of the armed spinner tick, if any
    next_tick: Option<Instant>,
    running: bool,
}

impl App {
    pub fn new(channels: TuiChannels, theme: Theme, preview_chars: usize) -> Self {
        Self {
            state: UiState::new(theme, preview_chars),
            channels,
            next_tick: None,
            running: true,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Main event loop
    ///
    /// Returns when the user quits, the terminal event stream ends, the
    /// Conductor drops its side of the bridge, or the session is closed.
    /// The close token is always fired on the way out.
    pub async fn run<B, S>(&mut self, terminal: &mut Terminal<B>, mut events: S) -> anyhow::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let result = self.event_loop(terminal, &mut events).await;
        self.channels.closed.cancel();
        result
    }

    async fn event_loop<B, S>(&mut self, terminal: &mut Terminal<B>, events: &mut S) -> anyhow::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let size = terminal.size()?;
        self.apply(UiEvent::Resize {
            width: size.width,
            height: size.height,
        });
        terminal.draw(|frame| render::draw(frame, &self.state))?;

        while self.running {
            let tick_at = self.next_tick;
            let wake = tokio::select! {
                biased;

                () = self.channels.closed.cancelled() => Wake::Closed,

                // Terminal input first so quit keys win
                event = events.next() => Wake::Terminal(event),

                event = self.channels.events.recv() => Wake::Core(event),

                () = sleep_until(tick_at.unwrap_or_else(Instant::now)), if tick_at.is_some() => Wake::Tick,
            };

            match wake {
                Wake::Closed => {
                    tracing::debug!("Session closed, leaving UI loop");
                    self.running = false;
                }
                Wake::Terminal(Some(Ok(event))) => match event {
                    // Only handle Press events (not Release or Repeat)
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.apply(UiEvent::Key(key));
                    }
                    Event::Resize(width, height) => self.apply(UiEvent::Resize { width, height }),
                    _ => continue,
                },
                Wake::Terminal(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Terminal event error");
                    self.running = false;
                }
                Wake::Terminal(None) => {
                    tracing::debug!("Terminal event stream ended");
                    self.running = false;
                }
                Wake::Core(Some(CoreEvent::Message(message))) => {
                    self.apply(UiEvent::MessageReceived(message));
                }
                Wake::Core(Some(CoreEvent::InputRequested)) => self.apply(UiEvent::InputRequested),
                Wake::Core(None) => {
                    tracing::debug!("Conductor side of the bridge dropped");
                    self.running = false;
                }
                Wake::Tick => {
                    self.next_tick = None;
                    self.apply(UiEvent::Tick);
                }
            }

            if self.running {
                terminal.draw(|frame| render::draw(frame, &self.state))?;
            }
        }

        Ok(())
    }

    fn apply(&mut self, event: UiEvent) {
        for effect in self.state.handle(event) {
            match effect {
                Effect::Submit(text) => match self.channels.input.try_send(text) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Input already pending, dropping submission");
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!("Input channel closed");
                    }
                },
                Effect::ScheduleTick => self.next_tick = Some(Instant::now() + TICK_INTERVAL),
                Effect::Quit => self.running = false,
            }
        }
    }
}
