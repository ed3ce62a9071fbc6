//! Architectural Enforcement Integration Tests
//!
//! Shared helpers for the checks under `tests/`:
//! - the Conductor core stays free of terminal-UI crates
//! - production code never sleeps a thread
//!
//! Paths are resolved from the workspace root so the tests run the same from
//! any working directory.

use std::fs;
use std::path::{Path, PathBuf};

/// A production source file, cut off at its `#[cfg(test)]` module
pub struct SourceFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn production_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| {
            let content = fs::read_to_string(e.path()).ok()?;
            Some(SourceFile {
                path: e.path().to_path_buf(),
                lines: production_lines(&content),
            })
        })
        .collect()
}

/// Lines before the test module, with line comments stripped
pub fn production_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .take_while(|line| line.trim() != "#[cfg(test)]")
        .map(|line| line.split("//").next().unwrap_or(line).to_string())
        .collect()
}

/// `path:line - text` for every line matching `predicate`
pub fn find_violations<F>(files: &[SourceFile], predicate: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    files
        .iter()
        .flat_map(|file| {
            file.lines
                .iter()
                .enumerate()
                .filter(|(_, line)| predicate(line))
                .map(|(idx, line)| format!("{}:{} - {}", file.path.display(), idx + 1, line.trim()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\n#[cfg(test)]\nmod tests { fn b() {} }\n";
        let lines = production_lines(source);
        assert_eq!(lines, vec!["fn a() {}".to_string(), String::new()]);
    }

    #[test]
    fn test_find_violations_reports_location() {
        let files = vec![SourceFile {
            path: PathBuf::from("x.rs"),
            lines: vec!["ok".to_string(), "bad()".to_string()],
        }];
        let found = find_violations(&files, |l| l.contains("bad"));
        assert_eq!(found, vec!["x.rs:2 - bad()".to_string()]);
    }

    #[test]
    fn test_workspace_root_contains_members() {
        assert!(workspace_root().join("conductor/core").exists());
    }
}
