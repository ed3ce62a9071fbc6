//! Tiller Conductor - Headless Agent Orchestration
//!
//! This crate provides the core agent loop for tiller, completely independent
//! of any UI framework. It can drive a full-screen terminal UI, a plain
//! console, or run headless under test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Display Surfaces                        │
//! │   ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │   │  Terminal UI │   │   Console    │   │  Test double   │   │
//! │   │  (ratatui)   │   │   (stdio)    │   │                │   │
//! │   └──────┬───────┘   └──────┬───────┘   └───────┬────────┘   │
//! │          └──────────────────┼───────────────────┘            │
//! │                 Message (down) / user input (up)             │
//! └─────────────────────────────┼────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼────────────────────────────────┐
//! │                      CONDUCTOR CORE                          │
//! │   ┌─────────────────────────┴──────────────────────────┐     │
//! │   │                     Conductor                      │     │
//! │   │  ┌──────────────┐  ┌─────────────┐  ┌───────────┐  │     │
//! │   │  │ Conversation │  │ ToolCatalog │  │  Gateway  │  │     │
//! │   │  └──────────────┘  └─────────────┘  └───────────┘  │     │
//! │   └────────────────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: The conversation state machine
//! - [`Message`]: Events sent from the Conductor to a display surface
//! - [`DisplaySurface`]: What a UI must provide
//! - [`ModelGateway`]: What a language-model backend must provide
//! - [`ToolCatalog`]: The registry of local tools the model may call
//! - [`Profile`]: Bundles of tools, prompt, model and token limit
//!
//! # Quick Start
//!
//! ```ignore
//! use tiller_conductor::{
//!     backend::AnthropicGateway, config::load_config_from_path, Conductor, ConductorConfig,
//!     Profile,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let profile = Profile::by_name("default")?;
//! let gateway = AnthropicGateway::from_config(&load_config_from_path(None)?)?;
//! let config = ConductorConfig::from_profile(&profile);
//! let mut conductor = Conductor::new(gateway, profile.tools, config);
//!
//! conductor.run(&surface, None, &CancellationToken::new()).await?;
//! ```

pub mod backend;
pub mod conductor;
pub mod config;
pub mod conversation;
pub mod messages;
pub mod profile;
pub mod surface;
pub mod tools;

pub use backend::{GatewayError, InferenceRequest, ModelGateway, ModelResponse};
pub use conductor::{Conductor, ConductorConfig, ConductorError, LoopState};
pub use config::{ConfigOverrides, ConfigSource, SurfaceKind, TillerConfig};
pub use conversation::{ContentItem, Conversation, InvocationId, ToolResultEntry, Turn};
pub use messages::{Message, MessageKind, ToolCallData, ToolResultData};
pub use profile::Profile;
pub use surface::DisplaySurface;
pub use tools::{ToolCatalog, ToolDefinition, ToolError, ToolOutcome};
