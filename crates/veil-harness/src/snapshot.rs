#![forbid(unsafe_code)]

//! Text snapshots under `tests/snapshots/`.
//!
//! Run `BLESS=1 cargo test --package veil-harness` to create or update them.

use std::fs;
use std::path::{Path, PathBuf};

/// Path of snapshot `name` for the crate at `manifest_dir`.
pub fn snapshot_path(manifest_dir: &str, name: &str) -> PathBuf {
    Path::new(manifest_dir)
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

fn is_bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1")
}

fn normalize(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Compare `actual` with the stored snapshot, or store it under `BLESS=1`.
///
/// # Panics
///
/// On mismatch, or when the snapshot is missing outside bless mode.
pub fn assert_snapshot_text(name: &str, actual: &str, manifest_dir: &str) {
    let path = snapshot_path(manifest_dir, name);
    let actual = normalize(actual);

    if is_bless() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|err| panic!("create {}: {err}", parent.display()));
        }
        fs::write(&path, format!("{actual}\n"))
            .unwrap_or_else(|err| panic!("write {}: {err}", path.display()));
        tracing::info!(snapshot = name, "blessed");
        return;
    }

    let expected = match fs::read_to_string(&path) {
        Ok(text) => normalize(&text),
        Err(_) => panic!(
            "snapshot '{name}' missing at {}; run with BLESS=1 to create it\n--- actual ---\n{actual}",
            path.display()
        ),
    };
    if expected != actual {
        panic!(
            "snapshot '{name}' mismatch\n{}",
            line_diff(&expected, &actual)
        );
    }
}

fn line_diff(expected: &str, actual: &str) -> String {
    let expected: Vec<&str> = expected.lines().collect();
    let actual: Vec<&str> = actual.lines().collect();
    let mut out = String::new();
    for i in 0..expected.len().max(actual.len()) {
        match (expected.get(i), actual.get(i)) {
            (Some(e), Some(a)) if e == a => out.push_str(&format!("  {e}\n")),
            (e, a) => {
                if let Some(e) = e {
                    out.push_str(&format!("- {e}\n"));
                }
                if let Some(a) = a {
                    out.push_str(&format!("+ {a}\n"));
                }
            }
        }
    }
    out
}

/// Assert that text matches the snapshot named `$name` in the calling
/// crate's `tests/snapshots/` directory.
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $actual:expr) => {
        $crate::snapshot::assert_snapshot_text($name, &$actual, env!("CARGO_MANIFEST_DIR"))
    };
}
