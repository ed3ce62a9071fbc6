//! Model Gateway Integration
//!
//! Abstracted access to language-model services through a common trait.
//!
//! # Available Gateways
//!
//! - **Anthropic**: Messages API over HTTPS (default)
//!
//! # Usage
//!
//! ```ignore
//! use tiller_conductor::backend::{AnthropicGateway, ModelGateway};
//! use tiller_conductor::config::load_config_from_path;
//!
//! let config = load_config_from_path(None)?;
//! let gateway = AnthropicGateway::from_config(&config)?;
//! let response = gateway.infer(&request).await?;
//! ```

mod anthropic;
mod traits;

pub use anthropic::{
    build_request_body, parse_response, AnthropicGateway, API_VERSION, DEFAULT_BASE_URL,
};
pub use traits::{GatewayError, InferenceRequest, ModelGateway, ModelResponse};
