use std::process::Command;

use serde::Deserialize;
use serde_json::Value;

use super::schema::{Property, ToolSchema};
use super::{combined_output, parse_input, ToolDefinition, ToolError};

const DESCRIPTION: &str = "Search for exact text patterns in files using ripgrep, a fast keyword search tool.

WHEN TO USE THIS TOOL:
- When you need to find exact text matches like variable names, function calls, or specific strings
- When you know the precise pattern you're looking for (including regex patterns)
- When you want to quickly locate all occurrences of a specific term across multiple files
- When you need to search for code patterns with exact syntax

WHEN NOT TO USE THIS TOOL:
- For semantic or conceptual searches (e.g., \"how does authentication work\")
- For finding code that implements a certain functionality without knowing the exact terms
- When you already have read the entire file

RESULT INTERPRETATION:
- Results show the file path, line number, and matching line content
- Results are grouped by file, with up to 15 matches per file";

const PROPERTIES: &[Property] = &[
    Property::string("pattern", "The pattern to search for"),
    Property::string("path", "The file or directory path to search in"),
    Property::boolean("caseSensitive", "Whether to search case-sensitively"),
];

/// Matches reported per file
const MAX_COUNT: &str = "15";

pub const RIPGREP: ToolDefinition = ToolDefinition {
    name: "ripgrep",
    description: DESCRIPTION,
    schema: ToolSchema::object(PROPERTIES),
    function: ripgrep,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RipgrepInput {
    pattern: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    case_sensitive: bool,
}

impl RipgrepInput {
    fn args(&self) -> Vec<&str> {
        let mut args = vec!["--line-number"];
        if !self.case_sensitive {
            args.push("-i");
        }
        args.extend(["--max-count", MAX_COUNT, self.pattern.as_str()]);
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            args.push(path);
        }
        args
    }
}

fn ripgrep(input: &Value) -> Result<String, ToolError> {
    let input: RipgrepInput = parse_input(input)?;
    let output = Command::new("rg")
        .args(input.args())
        .output()
        .map_err(|e| ToolError::Failed(format!("ripgrep error: {e}")))?;

    let text = combined_output(&output);
    match output.status.code() {
        Some(0) => Ok(text),
        // rg exits 1 when nothing matched
        Some(1) => Ok("No matches found.".to_string()),
        _ => Err(ToolError::Failed(format!(
            "ripgrep error: {} - {}",
            output.status, text
        ))),
    }
}
