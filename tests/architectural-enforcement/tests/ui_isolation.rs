//! Integration Test: Core Isolation from Terminal Concerns
//!
//! **Policy**: `sage-core` MUST NOT depend on or reference terminal crates.
//! Session, chat, and provider logic stay headless so any surface (TUI
//! today, others later) can reuse them unchanged.
//!
//! The check covers both the core manifest and every core source file.

use std::fs;
use std::path::{Path, PathBuf};

/// Terminal-only crates that must never appear in core
const FORBIDDEN_IN_CORE: &[&str] = &["ratatui", "crossterm"];

/// Test that sage-core has no terminal dependencies
#[test]
fn test_core_has_no_terminal_dependencies() {
    let root = workspace_root();
    let mut violations = Vec::new();

    let manifest = root.join("core/Cargo.toml");
    assert!(
        manifest.exists(),
        "expected the core manifest at {}",
        manifest.display()
    );
    check_manifest(&manifest, &mut violations);

    let sources = root.join("core/src");
    assert!(
        sources.exists(),
        "expected the core sources at {}",
        sources.display()
    );
    check_sources(&sources, &mut violations);

    if !violations.is_empty() {
        eprintln!("\n❌ Terminal dependencies found in sage-core!");
        eprintln!("Core must stay headless so other surfaces can reuse it.\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ Terminal code belongs under tui/ only.");

        panic!(
            "\nFound {} terminal dependency violation(s) in sage-core.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Resolve the workspace root relative to this package
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Check the core manifest for forbidden dependency entries
fn check_manifest(path: &Path, violations: &mut Vec<String>) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (idx, line) in content.lines().enumerate() {
        if let Some(name) = forbidden_in(line) {
            violations.push(format!(
                "{}:{} - Terminal crate '{}': {}",
                path.display(),
                idx + 1,
                name,
                line.trim()
            ));
        }
    }
}

/// Check every core source file for forbidden crate references
fn check_sources(dir: &Path, violations: &mut Vec<String>) {
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            check_file(entry.path(), violations);
        }
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (idx, line) in content.lines().enumerate() {
        if let Some(name) = forbidden_in(line) {
            violations.push(format!(
                "{}:{} - Terminal crate '{}': {}",
                path.display(),
                idx + 1,
                name,
                line.trim()
            ));
        }
    }
}

/// The forbidden crate referenced by `line`, if any. Comments are ignored.
fn forbidden_in(line: &str) -> Option<&'static str> {
    let code = line.split("//").next().unwrap_or(line);
    if code.trim_start().starts_with('#') {
        return None;
    }
    FORBIDDEN_IN_CORE
        .iter()
        .copied()
        .find(|name| code.contains(*name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_use_statement() {
        assert_eq!(
            forbidden_in("use ratatui::style::Color;"),
            Some("ratatui"),
            "Should detect a terminal crate import"
        );
        assert_eq!(
            forbidden_in("use crossterm::event::KeyCode;"),
            Some("crossterm"),
            "Should detect an event crate import"
        );
    }

    #[test]
    fn test_detects_manifest_entry() {
        assert_eq!(forbidden_in("ratatui = \"0.29\""), Some("ratatui"));
    }

    #[test]
    fn test_ignores_comments() {
        assert_eq!(forbidden_in("// ratatui stays out of core"), None);
        assert_eq!(forbidden_in("# crossterm belongs to the tui"), None);
    }

    #[test]
    fn test_accepts_clean_code() {
        assert_eq!(forbidden_in("use tokio::sync::mpsc;"), None);
    }
}
