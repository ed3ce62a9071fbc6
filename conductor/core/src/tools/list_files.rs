use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use super::schema::{Property, ToolSchema};
use super::{parse_input, ToolDefinition, ToolError};

const PROPERTIES: &[Property] = &[Property::string(
    "path",
    "Optional relative path to list files from. Defaults to current directory if not provided.",
)];

pub const LIST_FILES: ToolDefinition = ToolDefinition {
    name: "list_files",
    description: "List files and directories at a given path. If no path is provided, lists files in the current directory.",
    schema: ToolSchema::object(PROPERTIES),
    function: list_files,
};

#[derive(Deserialize, Default)]
#[serde(default)]
struct ListFilesInput {
    path: Option<String>,
}

/// Recursive listing relative to the root; directories end with `/`.
fn list_files(input: &Value) -> Result<String, ToolError> {
    let input: ListFilesInput = parse_input(input)?;
    let root = match input.path.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => ".",
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(Path::new(root))
            .unwrap_or_else(|_| entry.path());
        let mut display = relative.to_string_lossy().into_owned();
        if entry.file_type().is_dir() {
            display.push('/');
        }
        files.push(display);
    }

    serde_json::to_string(&files).map_err(|e| ToolError::Failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lists_recursively_with_directory_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();

        let out = list_files(&json!({ "path": dir.path() })).unwrap();
        let listed: Vec<String> = serde_json::from_str(&out).unwrap();

        assert_eq!(listed, vec!["README.md", "src/", "src/main.rs"]);
    }

    #[test]
    fn test_empty_directory_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let out = list_files(&json!({ "path": dir.path() })).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_files(&json!({ "path": missing })).is_err());
    }

    #[test]
    fn test_default_path_is_current_directory() {
        // Runs against the crate directory; just check it produces a JSON array
        let out = list_files(&json!({})).unwrap();
        let listed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert!(listed.iter().any(|p| p == "Cargo.toml"));
    }
}
