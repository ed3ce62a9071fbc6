//! Display Surface Contract
//!
//! A display surface is anything that renders [`Message`]s and supplies user
//! input: a plain console, a full-screen terminal UI, or a test double. The
//! Conductor only ever sees this trait; the concrete surface is chosen once
//! at construction time.

use async_trait::async_trait;

use crate::messages::Message;

/// Capability set every display surface provides
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    /// Deliver a message for display
    ///
    /// Fire-and-forget. Implementations must not hold the caller for more
    /// than a bounded time, and must deliver messages in call order.
    async fn send_message(&self, message: Message);

    /// Wait for the next line of user input
    ///
    /// Returns `None` once no further input will arrive (end of input, or the
    /// surface was closed).
    async fn user_input(&self) -> Option<String>;

    /// Whether the session should keep soliciting input after each turn
    fn is_interactive(&self) -> bool;

    /// Release resources and wake any pending [`user_input`](Self::user_input)
    ///
    /// Idempotent: calling it more than once is harmless.
    fn close(&self);
}
