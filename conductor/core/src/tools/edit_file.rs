use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::schema::{Property, ToolSchema};
use super::{parse_input, ToolDefinition, ToolError};

const PROPERTIES: &[Property] = &[
    Property::string("path", "The path to the file"),
    Property::string(
        "old_str",
        "Text to search for - must match exactly and must only have one match exactly",
    ),
    Property::string("new_str", "Text to replace old_str with"),
];

pub const EDIT_FILE: ToolDefinition = ToolDefinition {
    name: "edit_file",
    description: "Make edits to a text file. Replaces 'old_str' with 'new_str' in the given file. 'old_str' and 'new_str' MUST be different from each other. If the file specified with path doesn't exist, it will be created.",
    schema: ToolSchema::object(PROPERTIES),
    function: edit_file,
};

#[derive(Deserialize)]
struct EditFileInput {
    path: String,
    #[serde(default)]
    old_str: String,
    #[serde(default)]
    new_str: String,
}

fn edit_file(input: &Value) -> Result<String, ToolError> {
    let input: EditFileInput = parse_input(input)?;
    if input.path.is_empty() || input.old_str == input.new_str {
        return Err(ToolError::InvalidInput("invalid input parameters".to_string()));
    }

    let content = match std::fs::read_to_string(&input.path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && input.old_str.is_empty() => {
            return create_file(Path::new(&input.path), &input.new_str);
        }
        Err(e) => return Err(e.into()),
    };

    // An empty needle would match between every character
    if input.old_str.is_empty() || !content.contains(&input.old_str) {
        return Err(ToolError::Failed("old_str not found in file".to_string()));
    }

    let updated = content.replace(&input.old_str, &input.new_str);
    std::fs::write(&input.path, updated)?;
    Ok("OK".to_string())
}

fn create_file(path: &Path, content: &str) -> Result<String, ToolError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ToolError::Failed(format!("failed to create directory: {e}")))?;
    }
    std::fs::write(path, content)
        .map_err(|e| ToolError::Failed(format!("failed to create file: {e}")))?;
    Ok(format!("Successfully created file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replaces_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "foo bar foo").unwrap();

        let out = edit_file(&json!({"path": path, "old_str": "foo", "new_str": "baz"})).unwrap();

        assert_eq!(out, "OK");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "baz bar baz");
    }

    #[test]
    fn test_creates_missing_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/new.txt");

        let out = edit_file(&json!({"path": path, "old_str": "", "new_str": "hello"})).unwrap();

        assert!(out.starts_with("Successfully created file"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_rejects_identical_strings() {
        let err = edit_file(&json!({"path": "x.txt", "old_str": "a", "new_str": "a"})).unwrap_err();
        assert_eq!(err.to_string(), "invalid input parameters");
    }

    #[test]
    fn test_rejects_empty_path() {
        let err = edit_file(&json!({"path": "", "old_str": "a", "new_str": "b"})).unwrap_err();
        assert_eq!(err.to_string(), "invalid input parameters");
    }

    #[test]
    fn test_missing_needle_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "content").unwrap();

        let err = edit_file(&json!({"path": path, "old_str": "zzz", "new_str": "y"})).unwrap_err();
        assert_eq!(err.to_string(), "old_str not found in file");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_missing_file_with_needle_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let err = edit_file(&json!({"path": path, "old_str": "a", "new_str": "b"})).unwrap_err();
        assert!(matches!(err, ToolError::Io(_)));
    }
}
