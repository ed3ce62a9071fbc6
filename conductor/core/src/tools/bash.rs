use std::process::Command;

use serde::Deserialize;
use serde_json::Value;

use super::schema::{Property, ToolSchema};
use super::{combined_output, parse_input, ToolDefinition, ToolError};

const PROPERTIES: &[Property] = &[Property::string("command", "The command to execute")];

pub const BASH: ToolDefinition = ToolDefinition {
    name: "bash",
    description: "Execute a bash command.",
    schema: ToolSchema::object(PROPERTIES),
    function: bash,
};

#[derive(Deserialize)]
struct BashInput {
    command: String,
}

fn bash(input: &Value) -> Result<String, ToolError> {
    let input: BashInput = parse_input(input)?;
    let output = Command::new("bash")
        .arg("-c")
        .arg(&input.command)
        .output()
        .map_err(|e| ToolError::Failed(format!("command execution error: {e} - ")))?;

    let text = combined_output(&output);
    if output.status.success() {
        Ok(text)
    } else {
        Err(ToolError::Failed(format!(
            "command execution error: {} - {}",
            output.status, text
        )))
    }
}
