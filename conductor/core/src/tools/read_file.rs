use serde::Deserialize;
use serde_json::Value;

use super::schema::{Property, ToolSchema};
use super::{parse_input, ToolDefinition, ToolError};

const PROPERTIES: &[Property] = &[Property::string(
    "path",
    "The relative path of a file in the working directory",
)];

pub const READ_FILE: ToolDefinition = ToolDefinition {
    name: "read_file",
    description: "Read the contents of a given relative file path. Use this when you want to see what's inside a file. Do not use this with directory names.",
    schema: ToolSchema::object(PROPERTIES),
    function: read_file,
};

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

fn read_file(input: &Value) -> Result<String, ToolError> {
    let input: ReadFileInput = parse_input(input)?;
    Ok(std::fs::read_to_string(&input.path)?)
}
