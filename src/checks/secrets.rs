//! Secret scanning over a directory tree.

use std::path::Path;

use regex_lite::{Regex, RegexBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::CheckOutcome;

/// Maximum number of findings listed in a failure message.
const MAX_REPORTED_FINDINGS: usize = 5;

/// Length of the matched snippet shown per finding.
const SNIPPET_CHARS: usize = 50;

/// Substrings that mark a match as placeholder text rather than a secret.
const PLACEHOLDER_MARKERS: &[&str] = &["example", "your_"];

/// A suspected secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFinding {
    /// Path relative to the project root.
    pub file: String,
    pub snippet: String,
}

/// Fail if any file under `target` assigns a ≥10-character token to one of
/// the named `patterns`.
pub fn secret_scan(root: &Path, target: &str, patterns: &[String]) -> CheckOutcome {
    let dir = root.join(target);
    if !dir.exists() {
        return CheckOutcome::fail(format!("Target directory not found: {}", target));
    }

    let findings = find_secrets(root, &dir, patterns);
    if findings.is_empty() {
        return CheckOutcome::pass(format!("No secrets detected in: {}", target));
    }

    let listed: Vec<String> = findings
        .iter()
        .take(MAX_REPORTED_FINDINGS)
        .map(|f| format!("{}: {}", f.file, f.snippet))
        .collect();
    CheckOutcome::fail(format!("Potential secrets found:\n{}", listed.join("\n")))
}

/// Scan every visible file under `dir`.
///
/// Files below any dot-prefixed path component (relative to `root`) are
/// skipped, as are files that cannot be read.
pub fn find_secrets(root: &Path, dir: &Path, patterns: &[String]) -> Vec<SecretFinding> {
    let regexes: Vec<Regex> = patterns.iter().filter_map(|p| assignment_regex(p)).collect();
    let mut findings = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if rel
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            continue;
        }

        let content = match std::fs::read(entry.path()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", entry.path().display(), e);
                continue;
            }
        };

        for re in &regexes {
            for m in re.find_iter(&content) {
                let matched = m.as_str();
                if is_placeholder(matched) {
                    continue;
                }
                findings.push(SecretFinding {
                    file: rel.display().to_string(),
                    snippet: matched.chars().take(SNIPPET_CHARS).collect(),
                });
            }
        }
    }

    findings
}

/// `<pattern>` followed by an assignment-like separator and a token of at
/// least 10 word characters, case-insensitively.
fn assignment_regex(pattern: &str) -> Option<Regex> {
    let build = |name: &str| {
        RegexBuilder::new(&format!(r#"{}\s*[=:"]\s*["']?[a-zA-Z0-9_-]{{10,}}"#, name))
            .case_insensitive(true)
            .build()
    };

    match build(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Secret pattern '{}' is not a valid regex ({}); matching literally", pattern, e);
            build(&regex_lite::escape(pattern)).ok()
        }
    }
}

fn is_placeholder(matched: &str) -> bool {
    let lower = matched.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn patterns() -> Vec<String> {
        vec!["api_key".to_string(), "token".to_string()]
    }

    #[test]
    fn test_flags_real_looking_key() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src").join("config.js"),
            r#"const api_key = "abcdef1234567890";"#,
        )
        .unwrap();

        let outcome = secret_scan(dir.path(), "src", &patterns());
        assert!(!outcome.passed);
        assert!(outcome.message.starts_with("Potential secrets found:"));
        assert!(outcome.message.contains("config.js: api_key = \"abcdef1234567890"));
    }

    #[test]
    fn test_ignores_placeholders() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join("src").join("sample.env"),
            "api_key = \"example_value_only\"\ntoken: \"your_token_here\"\n",
        )
        .unwrap();

        let outcome = secret_scan(dir.path(), "src", &patterns());
        assert!(outcome.passed, "{}", outcome.message);
    }

    #[test]
    fn test_case_insensitive_pattern() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("a.py"), "API_KEY='zzzzzzzzzzzzzz'").unwrap();
        let findings = find_secrets(dir.path(), dir.path(), &patterns());
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_short_tokens_not_flagged() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("a.py"), "token = \"short\"").unwrap();
        assert!(find_secrets(dir.path(), dir.path(), &patterns()).is_empty());
    }

    #[test]
    fn test_hidden_paths_skipped() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("src").join(".git")).unwrap();
        fs::write(
            dir.path().join("src").join(".git").join("config"),
            "token = abcdefghijklmnop",
        )
        .unwrap();
        fs::write(dir.path().join("src").join(".env"), "token = abcdefghijklmnop").unwrap();

        assert!(secret_scan(dir.path(), "src", &patterns()).passed);
    }

    #[test]
    fn test_reports_at_most_five() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let body: String = (0..8)
            .map(|i| format!("token = abcdefghij{}\n", i))
            .collect();
        fs::write(dir.path().join("many.txt"), body).unwrap();

        let outcome = secret_scan(dir.path(), ".", &patterns());
        assert!(!outcome.passed);
        assert_eq!(outcome.message.lines().count(), 1 + MAX_REPORTED_FINDINGS);
    }

    #[test]
    fn test_missing_target_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let outcome = secret_scan(dir.path(), "absent", &patterns());
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Target directory not found: absent");
    }
}
