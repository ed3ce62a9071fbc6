//! Tool Catalog
//!
//! The fixed set of local operations the model may invoke. Each tool is a
//! synchronous function from raw JSON input to text, described by a name, a
//! human-readable description, and a hand-written input schema.
//!
//! # Design Philosophy
//!
//! Tools are opaque to the Conductor. Input is handed over unvalidated and
//! each tool parses what it needs; a parse failure is an ordinary
//! [`ToolError`], never a panic. Lookup misses are not errors either: they
//! come back as an error-flagged [`ToolOutcome`] so the model can recover.
//!
//! The catalog is built once at startup and shared read-only.

mod bash;
mod edit_file;
mod list_files;
mod read_file;
mod ripgrep;
pub mod schema;

use std::process::Output;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use bash::BASH;
pub use edit_file::EDIT_FILE;
pub use list_files::LIST_FILES;
pub use read_file::READ_FILE;
pub use ripgrep::RIPGREP;
pub use schema::{Property, PropertyType, ToolSchema};

/// Result text reported when the model names an unregistered tool
pub const TOOL_NOT_FOUND: &str = "tool not found";

/// Failure of a single tool invocation
///
/// The `Display` text is exactly what the model sees as the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input did not match the tool's schema or preconditions
    #[error("{0}")]
    InvalidInput(String),

    /// Filesystem or process I/O failure
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The operation ran but did not succeed
    #[error("{0}")]
    Failed(String),
}

/// Signature every tool implements
pub type ToolFn = fn(&Value) -> Result<String, ToolError>;

/// A registered tool
#[derive(Clone, Copy, Debug)]
pub struct ToolDefinition {
    /// Unique name within a catalog
    pub name: &'static str,
    /// Description shown to the model
    pub description: &'static str,
    /// Input schema shown to the model
    pub schema: ToolSchema,
    /// The implementation
    pub function: ToolFn,
}

/// Tool description in the shape model gateways consume
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Outcome of dispatching one invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutcome {
    fn ok(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn err(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<Result<String, ToolError>> for ToolOutcome {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => Self::ok(text),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Immutable registry of tools, looked up by exact name
#[derive(Clone, Debug, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Build a catalog; later duplicates of a name are ignored
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = ToolDefinition>) -> Self {
        let mut tools: Vec<ToolDefinition> = Vec::new();
        for def in definitions {
            if tools.iter().any(|t| t.name == def.name) {
                tracing::warn!(tool = def.name, "Duplicate tool registration ignored");
                continue;
            }
            tools.push(def);
        }
        Self { tools }
    }

    /// Every built-in tool
    #[must_use]
    pub fn all() -> Self {
        Self::new([READ_FILE, LIST_FILES, EDIT_FILE, RIPGREP, BASH])
    }

    /// Read-only browsing tools
    #[must_use]
    pub fn minimal() -> Self {
        Self::new([READ_FILE, LIST_FILES])
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|t| t.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Serialize the catalog for a model gateway
    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name.to_string(),
                description: t.description.to_string(),
                input_schema: t.schema.to_json(),
            })
            .collect()
    }

    /// Run a tool on the blocking pool and wait for it
    pub async fn execute(&self, name: &str, input: Value) -> ToolOutcome {
        let Some(def) = self.get(name).copied() else {
            return ToolOutcome::err(TOOL_NOT_FOUND);
        };
        match tokio::task::spawn_blocking(move || (def.function)(&input)).await {
            Ok(result) => result.into(),
            Err(e) => {
                tracing::error!(tool = def.name, error = %e, "Tool task failed");
                ToolOutcome::err(format!("tool {} failed: {e}", def.name))
            }
        }
    }
}

/// Deserialize tool input, mapping failures to [`ToolError::InvalidInput`]
pub(crate) fn parse_input<T: DeserializeOwned>(input: &Value) -> Result<T, ToolError> {
    T::deserialize(input).map_err(|e| ToolError::InvalidInput(format!("invalid input: {e}")))
}

/// Stdout followed by stderr, lossily decoded
pub(crate) fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
