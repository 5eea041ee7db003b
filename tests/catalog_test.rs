//! Tests for loading requirement catalogs from disk.

mod common;

use common::{TestProject, catalog_fixture, read_fixture};
use qagate::catalog::loader::{duplicate_ids, parse_catalog};
use qagate::{CatalogError, CheckKind, Severity, load_catalog};

#[test]
fn test_json_fixture_keeps_category_order() {
    let catalog = load_catalog(&catalog_fixture("requirements.json")).unwrap();

    let names: Vec<&str> = catalog.categories().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["file_structure", "notes", "data", "ui"]);
    assert_eq!(catalog.checks().count(), 6);
}

#[test]
fn test_category_without_checks_is_kept_but_empty() {
    let catalog = load_catalog(&catalog_fixture("requirements.json")).unwrap();
    let (_, notes) = catalog.categories().nth(1).unwrap();
    assert_eq!(notes.description, "Free-form notes without checks");
    assert!(notes.checks.is_none());
}

#[test]
fn test_check_fields_and_defaults() {
    let catalog = load_catalog(&catalog_fixture("requirements.json")).unwrap();
    let checks: Vec<_> = catalog.checks().collect();

    assert_eq!(checks[0].kind, CheckKind::FileExists);
    assert_eq!(checks[0].severity, Severity::Critical);

    let seed = checks.iter().find(|c| c.id == "DATA-001").unwrap();
    assert_eq!(seed.severity, Severity::Medium);

    let doc = checks.iter().find(|c| c.id == "DOC-001").unwrap();
    assert_eq!(doc.search_pattern, "install(ation)?");

    let smoke = checks.iter().find(|c| c.id == "UI-002").unwrap();
    assert_eq!(smoke.kind, CheckKind::CoveredByE2e("route_smoke".to_string()));
    assert_eq!(smoke.target, "");
}

#[test]
fn test_yaml_fixture_parses_by_extension() {
    let catalog = load_catalog(&catalog_fixture("requirements.yaml")).unwrap();
    let checks: Vec<_> = catalog.checks().collect();

    assert_eq!(checks.len(), 3);
    assert_eq!(checks[0].expected_branch, "main");
    assert_eq!(checks[1].severity, Severity::High);
    assert_eq!(checks[1].expected_environment, "github-pages");
    assert_eq!(checks[2].patterns, vec!["api_key", "secret", "token"]);
}

#[test]
fn test_same_content_parses_as_json_without_yaml_flag() {
    let content = read_fixture(catalog_fixture("requirements.json"));
    let catalog = parse_catalog(&content, false).unwrap();
    assert_eq!(catalog.checks().count(), 6);
}

#[test]
fn test_malformed_catalog_is_parse_error() {
    let project = TestProject::new();
    let path = project.write("qa/requirements.json", "{ \"requirements\": ");

    let err = load_catalog(&path).unwrap_err();
    assert!(matches!(err, CatalogError::ParseFailed { .. }));
}

#[test]
fn test_unknown_severity_is_parse_error() {
    let project = TestProject::new();
    let path = project.write(
        "qa/requirements.json",
        r#"{"requirements": {"a": {"checks": [
            {"id": "A-1", "name": "x", "type": "file_exists", "severity": "urgent"}
        ]}}}"#,
    );

    let err = load_catalog(&path).unwrap_err();
    assert!(err.to_string().contains("Unknown severity: urgent"));
}

#[test]
fn test_duplicate_ids_are_reported_not_rejected() {
    let catalog = parse_catalog(
        r#"{"requirements": {
            "a": {"checks": [{"id": "X-1", "name": "one", "type": "file_exists"}]},
            "b": {"checks": [{"id": "X-1", "name": "two", "type": "file_exists"}]}
        }}"#,
        false,
    )
    .unwrap();

    assert_eq!(catalog.checks().count(), 2);
    assert_eq!(duplicate_ids(&catalog), vec!["X-1".to_string()]);
}
