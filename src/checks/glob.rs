//! Shell-style glob expansion relative to the project root.
//!
//! Supports `*`, `?` and `[...]` within one path segment and `**` across
//! segments. Hidden entries (dot-prefixed) are never matched by a wildcard.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

/// Whether `target` contains glob metacharacters.
pub fn is_glob(target: &str) -> bool {
    target.contains(['*', '?', '['])
}

/// Expand `pattern` under `root`, returning matching files in sorted order.
///
/// A pattern without metacharacters expands to itself when it exists. An
/// invalid pattern matches nothing.
pub fn expand(root: &Path, pattern: &str) -> Vec<PathBuf> {
    if !is_glob(pattern) {
        let path = root.join(pattern);
        return if path.exists() { vec![path] } else { Vec::new() };
    }

    let set = match compile(pattern) {
        Ok(set) => set,
        Err(e) => {
            warn!("Invalid glob '{}': {}", pattern, e);
            return Vec::new();
        }
    };

    let base = root.join(literal_prefix(pattern));
    if !base.is_dir() {
        return Vec::new();
    }

    let mut matches: Vec<PathBuf> = WalkDir::new(&base)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .is_ok_and(|rel| set.is_match(rel))
        })
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches
}

/// Wildcards never cross a `/`; only `**` spans directories.
fn compile(pattern: &str) -> Result<GlobSet, globset::Error> {
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    builder.build()
}

/// Directory components before the first segment containing a wildcard.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let segments: Vec<&str> = pattern.split('/').collect();
    for segment in &segments[..segments.len().saturating_sub(1)] {
        if is_glob(segment) {
            break;
        }
        prefix.push(segment);
    }
    prefix
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(root: &Path, found: Vec<PathBuf>) -> Vec<String> {
        found
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }

    #[test]
    fn test_double_star_matches_any_depth() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "src/frontend/main.js");
        touch(dir.path(), "src/frontend/deep/util.js");
        touch(dir.path(), "src/frontend/style.css");

        let found = expand(dir.path(), "src/**/*.js");
        assert_eq!(
            names(dir.path(), found),
            vec!["src/app.js", "src/frontend/deep/util.js", "src/frontend/main.js"]
        );
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "src/nested/other.js");

        let found = expand(dir.path(), "src/*.js");
        assert_eq!(names(dir.path(), found), vec!["src/app.js"]);
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "src/.cache/built.js");
        touch(dir.path(), "src/.hidden.js");
        touch(dir.path(), "src/shown.js");

        let found = expand(dir.path(), "src/**/*.js");
        assert_eq!(names(dir.path(), found), vec!["src/shown.js"]);
    }

    #[test]
    fn test_character_class() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "src/page1.js");
        touch(dir.path(), "src/page2.js");
        touch(dir.path(), "src/page9.js");
        touch(dir.path(), "src/pageX.js");

        let found = expand(dir.path(), "src/page[12].js");
        assert_eq!(names(dir.path(), found), vec!["src/page1.js", "src/page2.js"]);

        let found = expand(dir.path(), "src/page[!0-9].js");
        assert_eq!(names(dir.path(), found), vec!["src/pageX.js"]);
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "src/app.js");
        assert!(expand(dir.path(), "src/[unclosed.js").is_empty());
    }

    #[test]
    fn test_literal_target() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        touch(dir.path(), "app.js");
        assert_eq!(expand(dir.path(), "app.js").len(), 1);
        assert!(expand(dir.path(), "missing.js").is_empty());
    }

    #[test]
    fn test_no_matches_for_missing_base() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        assert!(expand(dir.path(), "nowhere/**/*.js").is_empty());
    }
}
