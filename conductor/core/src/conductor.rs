//! Conductor - The Orchestration Core
//!
//! The Conductor drives a conversation between the user, the model gateway
//! and the tool catalog. It owns the transcript and the control-flow state
//! machine:
//!
//! ```text
//!            input                 text only (interactive)
//!   ReadingInput ──────► AwaitingModel ◄─────────────┐
//!        ▲                 │      │                  │
//!        │  error          │      │ tool requests    │
//!        └─(interactive)───┘      ▼                  │
//!                          DispatchingTools ─────────┘
//! ```
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. Everything the user sees goes out through
//! [`DisplaySurface::send_message`]; everything the user types comes in
//! through [`DisplaySurface::user_input`]. It runs as its own task and shares
//! no mutable state with the surface.
//!
//! The model call, the input wait and each tool execution are raced against a
//! [`CancellationToken`]. A tool abandoned this way is not awaited.


use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::backend::{GatewayError, InferenceRequest, ModelGateway};
use crate::conversation::{
    ContentItem, Conversation, ConversationError, InvocationId, ToolResultEntry,
};
use crate::messages::{Message, ToolCallData, ToolResultData};
use crate::profile::Profile;
use crate::surface::DisplaySurface;
use crate::tools::{ToolCatalog, ToolSpec};

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Model to use
    pub model: String,
    /// Maximum output tokens per call
    pub max_tokens: u32,
    /// System prompt
    pub system_prompt: String,
    /// Info line shown when an interactive session starts without a prompt
    pub greeting: Option<String>,
}

impl ConductorConfig {
    /// Derive configuration from a resolved profile
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            model: profile.model.clone(),
            max_tokens: profile.max_tokens,
            system_prompt: profile.system_prompt.clone(),
            greeting: Some(format!(
                "Chat with {} using profile '{}' (use CTRL+C to exit)",
                profile.model, profile.name
            )),
        }
    }
}

/// Where the conversation state machine currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting on the surface for the next user turn
    ReadingInput,
    /// Waiting on the model gateway
    AwaitingModel,
    /// Running the tool requests of the last assistant turn
    DispatchingTools,
}

/// Reasons [`Conductor::run`] stops with an error
#[derive(Debug, Error)]
pub enum ConductorError {
    /// Model call failed in non-interactive mode
    #[error("model gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// External cancellation
    #[error("cancelled")]
    Cancelled,

    /// Tool results did not line up with the requests
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

/// The Conductor - headless orchestration core
pub struct Conductor<G: ModelGateway> {
    /// Configuration
    config: ConductorConfig,
    /// Model gateway
    gateway: G,
    /// Tool catalog
    tools: ToolCatalog,
    /// Catalog in gateway shape, built once
    tool_specs: Vec<ToolSpec>,
    /// Transcript
    conversation: Conversation,
    /// Current state
    state: LoopState,
}

impl<G: ModelGateway> Conductor<G> {
    /// Create a new Conductor with the given gateway and tools
    pub fn new(gateway: G, tools: ToolCatalog, config: ConductorConfig) -> Self {
        let tool_specs = tools.specs();
        Self {
            config,
            gateway,
            tools,
            tool_specs,
            conversation: Conversation::new(),
            state: LoopState::ReadingInput,
        }
    }

    /// Get current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Get the transcript
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run the conversation until input ends, a fatal error, or cancellation
    ///
    /// With `initial` set, that text becomes the first user turn (without a
    /// `user_input` echo) and the loop starts by calling the model.
    ///
    /// # Errors
    ///
    /// - [`ConductorError::Cancelled`] when `cancel` fires at a suspension point
    /// - [`ConductorError::Gateway`] when a model call fails on a
    ///   non-interactive surface
    pub async fn run<S>(
        &mut self,
        surface: &S,
        initial: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<(), ConductorError>
    where
        S: DisplaySurface + ?Sized,
    {
        let interactive = surface.is_interactive();

        match initial.filter(|text| !text.trim().is_empty()) {
            Some(text) => {
                self.conversation.push_user(text);
                self.set_state(LoopState::AwaitingModel);
            }
            None => {
                if interactive {
                    if let Some(greeting) = self.config.greeting.clone() {
                        surface.send_message(Message::system_info(greeting)).await;
                    }
                }
                self.set_state(LoopState::ReadingInput);
            }
        }

        tracing::info!(
            gateway = self.gateway.name(),
            model = %self.config.model,
            interactive,
            "Conductor started"
        );

        loop {
            if cancel.is_cancelled() {
                return Err(ConductorError::Cancelled);
            }

            match self.state {
                LoopState::ReadingInput => {
                    let input = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ConductorError::Cancelled),
                        input = surface.user_input() => input,
                    };

                    let Some(text) = input else {
                        tracing::info!("Input exhausted, ending session");
                        return Ok(());
                    };
                    if text.trim().is_empty() {
                        continue;
                    }

                    self.conversation.push_user(text.clone());
                    surface.send_message(Message::user_input(text)).await;
                    self.set_state(LoopState::AwaitingModel);
                }

                LoopState::AwaitingModel => {
                    let request = InferenceRequest {
                        model: &self.config.model,
                        max_tokens: self.config.max_tokens,
                        system_prompt: &self.config.system_prompt,
                        conversation: &self.conversation,
                        tools: &self.tool_specs,
                    };
                    let result = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ConductorError::Cancelled),
                        result = self.gateway.infer(&request) => result,
                    };

                    let response = match result {
                        Ok(response) => response,
                        Err(e) => {
                            tracing::warn!(error = %e, "Model call failed");
                            surface.send_message(Message::error(e.to_string())).await;
                            if interactive {
                                self.set_state(LoopState::ReadingInput);
                                continue;
                            }
                            return Err(e.into());
                        }
                    };

                    // Text is shown even alongside tool requests so preambles are visible
                    let has_tool_use = response.has_tool_use();
                    for item in &response.content {
                        if let ContentItem::Text { text } = item {
                            surface.send_message(Message::assistant(text.clone())).await;
                        }
                    }
                    if response.content.is_empty() {
                        // Empty assistant turns are rejected by the API
                        tracing::warn!("Model returned an empty reply");
                    } else {
                        self.conversation.push_assistant(response.content);
                    }

                    if has_tool_use {
                        self.set_state(LoopState::DispatchingTools);
                    } else if interactive {
                        self.set_state(LoopState::ReadingInput);
                    } else {
                        tracing::info!("Single-shot turn complete");
                        return Ok(());
                    }
                }

                LoopState::DispatchingTools => {
                    let invocations: Vec<(InvocationId, String, Value)> = self
                        .conversation
                        .last()
                        .map(|turn| {
                            turn.tool_invocations()
                                .map(|inv| (inv.id.clone(), inv.name.to_string(), inv.input.clone()))
                                .collect()
                        })
                        .unwrap_or_default();

                    let mut results = Vec::with_capacity(invocations.len());
                    for (id, name, input) in invocations {
                        results.push(self.dispatch(surface, id, name, input, cancel).await?);
                    }

                    self.conversation.push_tool_results(results)?;
                    self.set_state(LoopState::AwaitingModel);
                }
            }
        }
    }

    /// Run one tool invocation, announcing it before and after
    async fn dispatch<S>(
        &self,
        surface: &S,
        id: InvocationId,
        name: String,
        input: Value,
        cancel: &CancellationToken,
    ) -> Result<ToolResultEntry, ConductorError>
    where
        S: DisplaySurface + ?Sized,
    {
        let call = ToolCallData {
            tool_name: name.clone(),
            tool_id: id.to_string(),
            input: input.clone(),
        };
        surface.send_message(Message::tool_call(&call)).await;

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(tool = %name, "Tool abandoned on cancellation");
                return Err(ConductorError::Cancelled);
            }
            outcome = self.tools.execute(&name, input) => outcome,
        };
        tracing::debug!(tool = %name, is_error = outcome.is_error, "Tool finished");

        let result = ToolResultData {
            tool_name: name,
            tool_id: id.to_string(),
            result: outcome.text.clone(),
            is_error: outcome.is_error,
        };
        surface.send_message(Message::tool_result(&result)).await;

        Ok(ToolResultEntry {
            invocation_id: id,
            content: outcome.text,
            is_error: outcome.is_error,
        })
    }

    fn set_state(&mut self, state: LoopState) {
        tracing::debug!(from = ?self.state, to = ?state, "Conductor state change");
        self.state = state;
    }
}
