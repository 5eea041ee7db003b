//! Check predicates and the type-tag dispatcher.
//!
//! Every predicate converts its own faults (missing files, parse errors,
//! subprocess failures, timeouts) into a failing [`CheckOutcome`]; nothing
//! escapes a check to abort the run.

pub mod documents;
pub mod filesystem;
pub mod glob;
pub mod scripts;
pub mod secrets;
pub mod workflow;

use std::path::Path;

use tracing::debug;

use crate::catalog::{Check, CheckKind};
use crate::config::Timeouts;
use crate::tools::ToolRunner;

/// Result of evaluating one predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
}

impl CheckOutcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// Everything a predicate may consult besides the check itself.
pub struct CheckContext<'a> {
    /// Project root all targets resolve against.
    pub root: &'a Path,
    /// HTML file scanned for test-id markers.
    pub markup_file: &'a Path,
    /// Playwright configuration passed to the browser test runner.
    pub playwright_config: &'a Path,
    pub timeouts: Timeouts,
    pub tools: &'a dyn ToolRunner,
}

/// Run the predicate matching the check's type tag.
pub async fn run_check(check: &Check, ctx: &CheckContext<'_>) -> CheckOutcome {
    let target = check.target.as_str();
    debug!("Dispatching {} ({}) on '{}'", check.id, check.kind, target);

    match &check.kind {
        CheckKind::FileExists => filesystem::file_exists(ctx.root, target),
        CheckKind::DirectoryExists => filesystem::directory_exists(ctx.root, target),
        CheckKind::DirectoryNotEmpty => filesystem::directory_not_empty(ctx.root, target),
        CheckKind::JsonValid => filesystem::json_valid(ctx.root, target),
        CheckKind::JsSyntaxCheck => scripts::js_syntax(ctx, target).await,
        CheckKind::PytestRun => scripts::pytest_run(ctx, target).await,
        CheckKind::DocumentationCheck => {
            documents::documentation_contains(ctx.root, target, &check.search_pattern)
        }
        CheckKind::SecretScan => secrets::secret_scan(ctx.root, target, &check.patterns),
        CheckKind::PlaywrightTest => scripts::playwright_test(ctx, target).await,
        CheckKind::ElementExists => documents::element_exists(ctx.markup_file, target),
        CheckKind::TestIdCheck => documents::test_ids_present(ctx.markup_file, &check.test_ids),
        CheckKind::WorkflowBranchCheck => {
            workflow::branch_configured(ctx.root, target, &check.expected_branch)
        }
        CheckKind::WorkflowEnvironmentCheck => {
            workflow::environment_configured(ctx.root, target, &check.expected_environment)
        }
        CheckKind::CoveredByE2e(tag) => {
            CheckOutcome::pass(format!("Check type '{}' covered by E2E tests", tag))
        }
        CheckKind::Unknown(tag) => CheckOutcome::fail(format!("Unknown check type: {}", tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MockToolRunner;

    fn check(kind: &str, target: &str) -> Check {
        serde_json::from_value(serde_json::json!({
            "id": "T-1",
            "name": "test",
            "type": kind,
            "target": target,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_type_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let tools = MockToolRunner::new();
        let markup = dir.path().join("index.html");
        let config = dir.path().join("playwright.config.js");
        let ctx = CheckContext {
            root: dir.path(),
            markup_file: &markup,
            playwright_config: &config,
            timeouts: Timeouts::default(),
            tools: &tools,
        };

        let outcome = run_check(&check("teleport_check", ""), &ctx).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Unknown check type: teleport_check");
    }

    #[tokio::test]
    async fn test_e2e_types_always_pass_without_running_tools() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut tools = MockToolRunner::new();
        tools.expect_run().never();
        let markup = dir.path().join("index.html");
        let config = dir.path().join("playwright.config.js");
        let ctx = CheckContext {
            root: dir.path(),
            markup_file: &markup,
            playwright_config: &config,
            timeouts: Timeouts::default(),
            tools: &tools,
        };

        for tag in crate::catalog::model::E2E_COVERED_TYPES {
            let outcome = run_check(&check(tag, ""), &ctx).await;
            assert!(outcome.passed, "{} should pass", tag);
            assert!(outcome.message.contains("covered by E2E tests"));
        }
    }

    #[tokio::test]
    async fn test_dispatch_reaches_filesystem_predicate() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();
        let tools = MockToolRunner::new();
        let markup = dir.path().join("index.html");
        let config = dir.path().join("playwright.config.js");
        let ctx = CheckContext {
            root: dir.path(),
            markup_file: &markup,
            playwright_config: &config,
            timeouts: Timeouts::default(),
            tools: &tools,
        };

        assert!(run_check(&check("file_exists", "README.md"), &ctx).await.passed);
        assert!(!run_check(&check("directory_exists", "README.md"), &ctx).await.passed);
    }
}
