//! Terminal UI Display Surface
//!
//! [`TuiSurface`] is the Conductor-side half of the bridge to the terminal
//! event loop; [`TuiChannels`] is the UI-side half. They share three things:
//!
//! - a bounded event channel (messages and input requests, in order)
//! - a single-slot input channel carrying submitted text back
//! - a close token either side may fire

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use tiller_conductor::{DisplaySurface, Message};

/// Capacity of the Conductor -> UI event channel
pub const MESSAGE_CHANNEL_CAPACITY: usize = 10;

/// Longest a message send may wait for room before the message is dropped
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Events flowing from the Conductor to the terminal UI
#[derive(Clone, Debug, PartialEq)]
pub enum CoreEvent {
    /// A message to append to the log
    Message(Message),
    /// The Conductor is waiting on the input channel
    InputRequested,
}

/// Conductor-facing half of the terminal UI bridge
pub struct TuiSurface {
    events: mpsc::Sender<CoreEvent>,
    input: Mutex<mpsc::Receiver<String>>,
    closed: CancellationToken,
    send_timeout: Duration,
}

/// UI-facing half of the terminal UI bridge
pub struct TuiChannels {
    pub events: mpsc::Receiver<CoreEvent>,
    pub input: mpsc::Sender<String>,
    pub closed: CancellationToken,
}

impl TuiSurface {
    /// Create a connected surface and channel pair
    pub fn channel() -> (Self, TuiChannels) {
        let (event_tx, event_rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
        let (input_tx, input_rx) = mpsc::channel(1);
        let closed = CancellationToken::new();

        let surface = Self {
            events: event_tx,
            input: Mutex::new(input_rx),
            closed: closed.clone(),
            send_timeout: SEND_TIMEOUT,
        };
        let channels = TuiChannels {
            events: event_rx,
            input: input_tx,
            closed,
        };
        (surface, channels)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    async fn send_event(&self, event: CoreEvent) {
        if self.closed.is_cancelled() {
            return;
        }
        tokio::select! {
            biased;
            () = self.closed.cancelled() => {}
            result = self.events.send_timeout(event, self.send_timeout) => {
                match result {
                    Ok(()) => {}
                    Err(mpsc::error::SendTimeoutError::Timeout(event)) => {
                        tracing::warn!(?event, "UI did not drain events in time, dropping");
                    }
                    Err(mpsc::error::SendTimeoutError::Closed(_)) => {
                        tracing::debug!("UI event channel closed");
                    }
                }
            }
        }
    }

    /// Announce an input wait, waiting for room as long as it takes
    ///
    /// Never dropped: the UI only re-enables input on this event. Returns
    /// false once the UI is gone.
    async fn request_input(&self) -> bool {
        tokio::select! {
            biased;
            () = self.closed.cancelled() => false,
            result = self.events.send(CoreEvent::InputRequested) => {
                if result.is_err() {
                    tracing::debug!("UI event channel closed");
                }
                result.is_ok()
            }
        }
    }
}

#[async_trait]
impl DisplaySurface for TuiSurface {
    async fn send_message(&self, message: Message) {
        self.send_event(CoreEvent::Message(message)).await;
    }

    async fn user_input(&self) -> Option<String> {
        if self.closed.is_cancelled() {
            return None;
        }
        if !self.request_input().await {
            return None;
        }

        let mut input = self.input.lock().await;
        tokio::select! {
            biased;
            () = self.closed.cancelled() => None,
            text = input.recv() => text,
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }

    fn close(&self) {
        if !self.closed.is_cancelled() {
            tracing::debug!("Closing terminal UI surface");
        }
        self.closed.cancel();
    }
}
