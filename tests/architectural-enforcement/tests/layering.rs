//! Integration Test: Core Layering
//!
//! The Conductor core is headless. It must not depend on, or import, any
//! terminal-UI crate; only display surfaces may.

use std::fs;

use architectural_enforcement::{find_violations, production_sources, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm", "pulldown-cmark"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest readable");

    for krate in UI_CRATES {
        let declared = manifest.lines().any(|line| {
            let line = line.trim_start();
            line.starts_with(&format!("{krate} ")) || line.starts_with(&format!("{krate}="))
        });
        assert!(!declared, "conductor/core must not depend on {krate}");
    }
}

#[test]
fn test_core_sources_do_not_import_ui_crates() {
    let files = production_sources("conductor/core/src");
    assert!(!files.is_empty(), "no core sources found");

    let violations = find_violations(&files, |line| {
        UI_CRATES
            .iter()
            .map(|k| k.replace('-', "_"))
            .any(|k| line.contains(&format!("{k}::")))
    });
    assert!(
        violations.is_empty(),
        "UI crates referenced from the core:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_core_does_not_depend_on_tui_crate() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest readable");
    assert!(!manifest.contains("tiller-tui"));
}
