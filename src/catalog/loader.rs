//! Catalog loading from JSON or YAML.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::CatalogError;

use super::model::Catalog;

/// Read and parse the requirement catalog.
///
/// The format is chosen by extension: `.yaml`/`.yml` parse as YAML, anything
/// else as JSON. Duplicate check ids are reported with a warning but kept.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = parse_catalog(&content, is_yaml(path)).map_err(|message| {
        CatalogError::ParseFailed {
            path: path.to_path_buf(),
            message,
        }
    })?;

    for id in duplicate_ids(&catalog) {
        warn!("Check id '{}' appears more than once in {}", id, path.display());
    }

    debug!(
        "Loaded {} checks from {}",
        catalog.checks().count(),
        path.display()
    );

    Ok(catalog)
}

/// Parse catalog content in the given format.
pub fn parse_catalog(content: &str, yaml: bool) -> Result<Catalog, String> {
    if yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}

/// Check ids that occur more than once, in order of their second appearance.
pub fn duplicate_ids(catalog: &Catalog) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for check in catalog.checks() {
        if !seen.insert(check.id.as_str()) && !duplicates.contains(&check.id) {
            duplicates.push(check.id.clone());
        }
    }
    duplicates
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_catalog() {
        let yaml = r#"
requirements:
  structure:
    description: Project structure
    checks:
      - id: STR-001
        name: README present
        type: file_exists
        severity: high
        target: README.md
"#;
        let catalog = parse_catalog(yaml, true).unwrap();
        let check = catalog.checks().next().unwrap();
        assert_eq!(check.id, "STR-001");
        assert_eq!(check.target, "README.md");
    }

    #[test]
    fn test_duplicate_ids_detected_once() {
        let json = r#"{"requirements": {
            "a": {"description": "A", "checks": [
                {"id": "X-1", "name": "one", "type": "file_exists"},
                {"id": "X-1", "name": "two", "type": "file_exists"}
            ]},
            "b": {"description": "B", "checks": [
                {"id": "X-1", "name": "three", "type": "file_exists"},
                {"id": "Y-1", "name": "four", "type": "file_exists"}
            ]}
        }}"#;
        let catalog = parse_catalog(json, false).unwrap();
        assert_eq!(duplicate_ids(&catalog), vec!["X-1".to_string()]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = load_catalog(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::ReadFailed { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("requirements.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = load_catalog(&path);
        assert!(matches!(result, Err(CatalogError::ParseFailed { .. })));
    }
}
