//! Filesystem predicates: existence, emptiness, JSON well-formedness.

use std::path::Path;

use super::CheckOutcome;

/// Pass iff `target` exists and is a regular file.
pub fn file_exists(root: &Path, target: &str) -> CheckOutcome {
    let path = root.join(target);
    if path.is_file() {
        CheckOutcome::pass(format!("File exists: {}", target))
    } else {
        CheckOutcome::fail(format!("File not found: {}", target))
    }
}

/// Pass iff `target` exists and is a directory.
pub fn directory_exists(root: &Path, target: &str) -> CheckOutcome {
    let path = root.join(target);
    if path.is_dir() {
        CheckOutcome::pass(format!("Directory exists: {}", target))
    } else {
        CheckOutcome::fail(format!("Directory not found: {}", target))
    }
}

/// Pass iff `target` is a directory with at least one entry.
pub fn directory_not_empty(root: &Path, target: &str) -> CheckOutcome {
    let path = root.join(target);
    if !path.exists() {
        return CheckOutcome::fail(format!("Directory not found: {}", target));
    }
    if !path.is_dir() {
        return CheckOutcome::fail(format!("Path is not a directory: {}", target));
    }

    let count = match std::fs::read_dir(&path) {
        Ok(entries) => entries.filter_map(Result::ok).count(),
        Err(e) => return CheckOutcome::fail(format!("Cannot read directory {}: {}", target, e)),
    };

    if count == 0 {
        CheckOutcome::fail(format!("Directory is empty: {}", target))
    } else {
        CheckOutcome::pass(format!("Directory exists with {} items: {}", count, target))
    }
}

/// Pass iff `target` parses as JSON. Structure is not inspected.
pub fn json_valid(root: &Path, target: &str) -> CheckOutcome {
    let path = root.join(target);
    if !path.exists() {
        return CheckOutcome::fail(format!("File not found: {}", target));
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return CheckOutcome::fail(format!("Error reading {}: {}", target, e)),
    };

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(_) => CheckOutcome::pass(format!("Valid JSON: {}", target)),
        Err(e) => CheckOutcome::fail(format!("Invalid JSON in {}: {}", target, e)),
    }
}
