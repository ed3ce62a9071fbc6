//! Agent Profiles
//!
//! A profile bundles everything that shapes one kind of session: the tool
//! set, the system prompt, the model and its output limit. Profiles are
//! registered statically and selected by name at startup.

use std::fmt::Write as _;

use thiserror::Error;

use crate::tools::ToolCatalog;

/// Model used by the built-in profiles
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-0";

/// Output token limit used by the built-in profiles
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// System prompt for the general-purpose profile
pub const CODING_AGENT_PROMPT: &str = "You are a powerful AI coding agent specialized in software engineering tasks.
You excel at:
- Writing clean, efficient, and well-documented code
- Debugging and troubleshooting issues
- Code refactoring and optimization
- Following best practices and design patterns
- Understanding complex codebases and architectures

Always provide clear explanations for your code changes and suggestions.
";

/// System prompt for the minimal profile
pub const MINIMAL_PROMPT: &str =
    "You are a helpful AI assistant. You provide concise and accurate responses.";

const PROMPT_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown profile '{name}' (available: {available})")]
    Unknown { name: String, available: String },
}

/// A named session configuration
#[derive(Clone, Debug)]
pub struct Profile {
    pub name: &'static str,
    pub description: &'static str,
    pub model: String,
    pub max_tokens: u32,
    pub tools: ToolCatalog,
    pub system_prompt: String,
}

impl Profile {
    /// General-purpose profile with every tool
    #[must_use]
    pub fn coding() -> Self {
        Self {
            name: "default",
            description: "General-purpose profile with all tools and standard prompt",
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            tools: ToolCatalog::all(),
            system_prompt: CODING_AGENT_PROMPT.to_string(),
        }
    }

    /// Lightweight profile with read-only tools
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            name: "minimal",
            description: "Lightweight profile with minimal tools for basic tasks",
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            tools: ToolCatalog::minimal(),
            system_prompt: MINIMAL_PROMPT.to_string(),
        }
    }

    /// All built-in profiles, in display order
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::coding(), Self::minimal()]
    }

    /// Look up a built-in profile by exact name
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Unknown`] listing the valid names.
    pub fn by_name(name: &str) -> Result<Self, ProfileError> {
        let profiles = Self::builtin();
        let names: Vec<&str> = profiles.iter().map(|p| p.name).collect();
        let available = names.join(", ");
        profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or(ProfileError::Unknown {
                name: name.to_string(),
                available,
            })
    }

    /// Replace model and token limit where configured
    #[must_use]
    pub fn with_overrides(mut self, model: Option<&str>, max_tokens: Option<u32>) -> Self {
        if let Some(model) = model {
            self.model = model.to_string();
        }
        if let Some(tokens) = max_tokens {
            self.max_tokens = tokens;
        }
        self
    }

    /// First characters of the trimmed system prompt
    #[must_use]
    pub fn prompt_preview(&self) -> String {
        self.system_prompt
            .trim()
            .chars()
            .take(PROMPT_PREVIEW_CHARS)
            .collect()
    }
}

/// Human-readable listing of the built-in profiles
#[must_use]
pub fn describe_profiles() -> String {
    let mut out = String::from("Available profiles:\n\n");
    for profile in Profile::builtin() {
        let _ = writeln!(out, "  {}:", profile.name);
        let _ = writeln!(out, "    Description: {}", profile.description);
        let _ = writeln!(out, "    Model: {}", profile.model);
        let _ = writeln!(out, "    Max Tokens: {}", profile.max_tokens);
        let _ = writeln!(out, "    Tools: {} available", profile.tools.len());
        let _ = writeln!(out, "    System Prompt: {}...", profile.prompt_preview());
        out.push('\n');
    }
    out
}
