//! Core/UI Separation Tests
//!
//! `teller-core` must stay renderable anywhere: no terminal UI types may
//! leak into it, and nothing in any crate may block the runtime with a
//! thread sleep (the simulated backend delays through the async timer).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

fn core_src() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../teller/core/src")
}

fn workspace_src_files() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    ["teller/core/src", "tui/src"]
        .iter()
        .flat_map(|dir| {
            WalkDir::new(root.join(dir))
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
                .map(|e| e.path().to_path_buf())
        })
        .collect()
}

#[test]
fn core_has_no_ui_dependencies() {
    let mut violations = Vec::new();

    for entry in WalkDir::new(core_src())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
    {
        let source = std::fs::read_to_string(entry.path()).expect("readable source file");
        // Doc comments may *say* "no ratatui"; only code lines count
        for line in source.lines().filter(|l| !l.trim_start().starts_with("//")) {
            for needle in ["ratatui", "crossterm"] {
                if line.contains(needle) {
                    violations.push(format!("{} references {needle}", entry.path().display()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "teller-core must not touch the UI stack:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_blocking_sleeps_in_production_code() {
    let mut violations = Vec::new();

    for path in workspace_src_files() {
        let source = std::fs::read_to_string(&path).expect("readable source file");
        if source.contains("thread::sleep") {
            violations.push(path.display().to_string());
        }
    }

    assert!(
        violations.is_empty(),
        "blocking sleeps found (use tokio::time::sleep):\n{}",
        violations.join("\n")
    );
}
