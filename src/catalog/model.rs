//! Requirement catalog types.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Severity of a check. Only `Critical` affects the overall status.
///
/// Serializes to lowercase (e.g., `"critical"`). Deserializes case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Severity>().map_err(serde::de::Error::custom)
    }
}

/// Browser-interaction check types that are executed by the end-to-end suite
/// rather than by the runner itself.
pub const E2E_COVERED_TYPES: &[&str] = &[
    "route_smoke",
    "wiring_runtime",
    "state_persistence",
    "admin_gating",
    "responsive_check",
    "access_control",
    "route_check",
    "static_analysis",
];

/// The type tag of a check, selecting which predicate runs it.
///
/// Unrecognised tags are kept verbatim so they can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckKind {
    FileExists,
    DirectoryExists,
    DirectoryNotEmpty,
    JsonValid,
    JsSyntaxCheck,
    PytestRun,
    DocumentationCheck,
    SecretScan,
    PlaywrightTest,
    ElementExists,
    TestIdCheck,
    WorkflowBranchCheck,
    WorkflowEnvironmentCheck,
    CoveredByE2e(String),
    Unknown(String),
}

impl CheckKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::FileExists => "file_exists",
            Self::DirectoryExists => "directory_exists",
            Self::DirectoryNotEmpty => "directory_not_empty",
            Self::JsonValid => "json_valid",
            Self::JsSyntaxCheck => "js_syntax_check",
            Self::PytestRun => "pytest_run",
            Self::DocumentationCheck => "documentation_check",
            Self::SecretScan => "secret_scan",
            Self::PlaywrightTest => "playwright_test",
            Self::ElementExists => "element_exists",
            Self::TestIdCheck => "testid_check",
            Self::WorkflowBranchCheck => "workflow_branch_check",
            Self::WorkflowEnvironmentCheck => "workflow_environment_check",
            Self::CoveredByE2e(tag) | Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for CheckKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "file_exists" => Self::FileExists,
            "directory_exists" => Self::DirectoryExists,
            "directory_not_empty" => Self::DirectoryNotEmpty,
            "json_valid" => Self::JsonValid,
            "js_syntax_check" => Self::JsSyntaxCheck,
            "pytest_run" => Self::PytestRun,
            "documentation_check" => Self::DocumentationCheck,
            "secret_scan" => Self::SecretScan,
            "playwright_test" => Self::PlaywrightTest,
            "element_exists" => Self::ElementExists,
            "testid_check" => Self::TestIdCheck,
            "workflow_branch_check" => Self::WorkflowBranchCheck,
            "workflow_environment_check" => Self::WorkflowEnvironmentCheck,
            t if E2E_COVERED_TYPES.contains(&t) => Self::CoveredByE2e(tag),
            _ => Self::Unknown(tag),
        }
    }
}

impl From<CheckKind> for String {
    fn from(kind: CheckKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_environment() -> String {
    "github-pages".to_string()
}

/// A single verification rule from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CheckKind,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub search_pattern: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub test_ids: Vec<String>,
    #[serde(default = "default_branch")]
    pub expected_branch: String,
    #[serde(default = "default_environment")]
    pub expected_environment: String,
}

/// A named group of checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub description: String,
    /// `None` when the category has no `checks` key; such categories are skipped.
    #[serde(default)]
    pub checks: Option<Vec<Check>>,
}

/// The full declarative set of categories and checks driving a run.
///
/// Category order is the order of appearance in the source document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub requirements: OrderedCategories,
}

impl Catalog {
    /// Iterate categories in document order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.requirements
            .0
            .iter()
            .map(|(name, category)| (name.as_str(), category))
    }

    /// Iterate every check in catalog order.
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.categories()
            .filter_map(|(_, category)| category.checks.as_ref())
            .flatten()
    }
}

/// Category map that keeps document order (JSON and YAML objects alike).
#[derive(Debug, Clone, Default)]
pub struct OrderedCategories(pub Vec<(String, Category)>);

impl<'de> Deserialize<'de> for OrderedCategories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = OrderedCategories;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of category name to category")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, category)) = map.next_entry::<String, Category>()? {
                    categories.push((name, category));
                }
                Ok(OrderedCategories(categories))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
