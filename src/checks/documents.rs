//! Text-content predicates: documentation patterns and HTML test-id markers.

use std::path::Path;

use regex_lite::RegexBuilder;

use super::CheckOutcome;

/// Pass iff the case-insensitive regex `pattern` matches somewhere in `target`.
pub fn documentation_contains(root: &Path, target: &str, pattern: &str) -> CheckOutcome {
    let path = root.join(target);
    if !path.exists() {
        return CheckOutcome::fail(format!("Documentation file not found: {}", target));
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return CheckOutcome::fail(format!("Error reading {}: {}", target, e)),
    };

    let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            return CheckOutcome::fail(format!("Invalid search pattern '{}': {}", pattern, e));
        }
    };

    if re.is_match(&content) {
        CheckOutcome::pass(format!(
            "Documentation contains pattern '{}' in {}",
            pattern, target
        ))
    } else {
        CheckOutcome::fail(format!("Pattern '{}' not found in {}", pattern, target))
    }
}

/// The literal marker searched for in the markup file.
pub fn test_id_marker(test_id: &str) -> String {
    format!("data-testid=\"{}\"", test_id)
}

/// Pass iff the markup file carries `data-testid="<test_id>"`.
pub fn element_exists(markup_file: &Path, test_id: &str) -> CheckOutcome {
    let content = match read_markup(markup_file) {
        Ok(c) => c,
        Err(outcome) => return outcome,
    };

    if content.contains(&test_id_marker(test_id)) {
        CheckOutcome::pass(format!("Element with test ID '{}' exists", test_id))
    } else {
        CheckOutcome::fail(format!("Element with test ID '{}' not found", test_id))
    }
}

/// Pass iff every id in `test_ids` is present as a marker.
pub fn test_ids_present(markup_file: &Path, test_ids: &[String]) -> CheckOutcome {
    let content = match read_markup(markup_file) {
        Ok(c) => c,
        Err(outcome) => return outcome,
    };

    let missing: Vec<&str> = test_ids
        .iter()
        .filter(|id| !content.contains(&test_id_marker(id)))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        CheckOutcome::pass(format!("All {} required test IDs present", test_ids.len()))
    } else {
        CheckOutcome::fail(format!("Missing test IDs: {}", missing.join(", ")))
    }
}

fn read_markup(markup_file: &Path) -> Result<String, CheckOutcome> {
    let name = markup_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| markup_file.display().to_string());

    if !markup_file.exists() {
        return Err(CheckOutcome::fail(format!("{} not found", name)));
    }

    std::fs::read(markup_file)
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .map_err(|e| CheckOutcome::fail(format!("Error reading {}: {}", name, e)))
}
