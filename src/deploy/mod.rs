//! Deployment verification against a hosted site and its GitHub repository.
//!
//! Five checks run in a fixed order: environment policy, latest workflow run,
//! URL reachability, page content (only after a reachable URL), and the
//! deployment record. Checks that cannot reach a conclusion report SKIP.

pub mod auth;
pub mod github;
pub mod site;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use colored::*;
use octocrab::Octocrab;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Severity;
use crate::error::{ReportError, SiteError};
use crate::runner::Summary;
use crate::runner::report::write_atomically;

/// Three-valued outcome; SKIP means "could not determine" and never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployStatus {
    Pass,
    Fail,
    Skip,
}

impl DeployStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentCheckResult {
    pub id: String,
    pub name: String,
    pub status: DeployStatus,
    pub severity: Severity,
    pub message: String,
    pub details: String,
}

impl DeploymentCheckResult {
    /// A critical check, SKIP until decided.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: DeployStatus::Skip,
            severity: Severity::Critical,
            message: String::new(),
            details: String::new(),
        }
    }

    pub fn pass(self, message: impl Into<String>) -> Self {
        self.decide(DeployStatus::Pass, message.into(), String::new())
    }

    pub fn fail(self, message: impl Into<String>, details: impl Into<String>) -> Self {
        self.decide(DeployStatus::Fail, message.into(), details.into())
    }

    pub fn skip(self, message: impl Into<String>, details: impl Into<String>) -> Self {
        self.decide(DeployStatus::Skip, message.into(), details.into())
    }

    fn decide(mut self, status: DeployStatus, message: String, details: String) -> Self {
        self.status = status;
        self.message = message;
        self.details = details;
        self
    }

    pub fn is_critical_failure(&self) -> bool {
        self.status == DeployStatus::Fail && self.severity.is_critical()
    }
}

/// The deployment being verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub owner: String,
    pub repo: String,
    pub environment: String,
    pub url: String,
    /// Workflow file name under `.github/workflows/`.
    pub workflow: String,
    /// Literals that must all appear in the deployed page.
    pub expected_content: Vec<String>,
}

impl Default for DeployTarget {
    fn default() -> Self {
        Self {
            owner: "Lovable-LDCS".to_string(),
            repo: "PIT-Project-Implementation-Tracker".to_string(),
            environment: "github-pages".to_string(),
            url: "https://lovable-ldcs.github.io/PIT-Project-Implementation-Tracker/".to_string(),
            workflow: "deploy-pages.yml".to_string(),
            expected_content: vec![
                "TID-SHELL-ROOT".to_string(),
                "PIT - Project Implementation Tracker".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub timestamp: String,
    pub checks: Vec<DeploymentCheckResult>,
    pub summary: Summary,
}

impl DeploymentReport {
    pub fn new(checks: Vec<DeploymentCheckResult>) -> Self {
        let mut summary = Summary::default();
        for check in &checks {
            summary.total += 1;
            match check.status {
                DeployStatus::Pass => summary.passed += 1,
                DeployStatus::Fail => summary.failed += 1,
                DeployStatus::Skip => summary.skipped += 1,
            }
        }
        Self {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            checks,
            summary,
        }
    }

    pub fn critical_failures(&self) -> impl Iterator<Item = &DeploymentCheckResult> {
        self.checks.iter().filter(|c| c.is_critical_failure())
    }

    /// 1 iff any critical check failed. SKIP never blocks.
    pub fn exit_code(&self) -> u8 {
        if self.critical_failures().next().is_some() { 1 } else { 0 }
    }

    pub fn export(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self).map_err(ReportError::SerializeFailed)?;
        write_atomically(path, json.as_bytes())
    }
}

/// Runs the fixed check sequence.
pub struct DeploymentVerifier {
    target: DeployTarget,
    github: Option<Octocrab>,
    http: Client,
    http_timeout: Duration,
    echo: bool,
}

impl DeploymentVerifier {
    /// `github` is `None` when no credentials were found; the API checks then SKIP.
    pub fn new(
        target: DeployTarget,
        github: Option<Octocrab>,
        http_timeout: Duration,
    ) -> Result<Self, SiteError> {
        Ok(Self {
            target,
            github,
            http: site::http_client(http_timeout)?,
            http_timeout,
            echo: true,
        })
    }

    /// Suppress console output.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub async fn run(&self) -> DeploymentReport {
        let target = &self.target;
        let mut checks = Vec::new();

        if self.echo {
            println!("\n{}\n", "=== Deployment Verification Checks ===".bold());
        }

        self.announce("Checking GitHub environment protection rules...");
        let env = match &self.github {
            Some(client) => github::check_environment(client, target).await,
            None => {
                let (id, name) = github::ENVIRONMENT_CHECK;
                github::without_credentials(id, name, "environment")
            }
        };
        self.record(&mut checks, env);

        self.announce("Checking latest workflow run...");
        let run = match &self.github {
            Some(client) => github::check_workflow_run(client, target).await,
            None => {
                let (id, name) = github::WORKFLOW_CHECK;
                github::without_credentials(id, name, "workflow")
            }
        };
        self.record(&mut checks, run);

        self.announce("Checking live URL accessibility...");
        let reachable = site::check_reachability(&self.http, &target.url, self.http_timeout).await;
        let reachable_passed = reachable.status == DeployStatus::Pass;
        self.record(&mut checks, reachable);

        if reachable_passed {
            self.announce("Checking deployed content...");
            let content = site::check_content(
                &self.http,
                &target.url,
                &target.expected_content,
                self.http_timeout,
            )
            .await;
            self.record(&mut checks, content);
        }

        self.announce("Checking GitHub deployment status...");
        let deployment = match &self.github {
            Some(client) => github::check_deployment_status(client, target).await,
            None => {
                let (id, name) = github::DEPLOYMENT_CHECK;
                github::without_credentials(id, name, "deployment status")
            }
        };
        self.record(&mut checks, deployment);

        let report = DeploymentReport::new(checks);
        info!(
            "Deployment verification finished: {} passed, {} failed, {} skipped",
            report.summary.passed, report.summary.failed, report.summary.skipped
        );
        report
    }

    fn announce(&self, what: &str) {
        if self.echo {
            println!("{}", what);
        }
    }

    fn record(&self, checks: &mut Vec<DeploymentCheckResult>, result: DeploymentCheckResult) {
        if self.echo {
            print_check(&result);
        }
        checks.push(result);
    }
}

fn colored_status(status: DeployStatus) -> ColoredString {
    match status {
        DeployStatus::Pass => status.as_str().green(),
        DeployStatus::Fail => status.as_str().red(),
        DeployStatus::Skip => status.as_str().yellow(),
    }
}

pub fn print_check(result: &DeploymentCheckResult) {
    println!(
        "  [{}] {}: {}\n",
        colored_status(result.status),
        result.name,
        result.message
    );
}

/// Summary block printed after the report is saved.
pub fn print_outcome(report: &DeploymentReport) {
    let s = &report.summary;
    println!(
        "\nSummary: {} passed, {} failed, {} skipped",
        s.passed, s.failed, s.skipped
    );

    let failures: Vec<_> = report.critical_failures().collect();
    if failures.is_empty() {
        println!(
            "\n{}",
            "✅ All critical deployment checks passed or skipped".green()
        );
        return;
    }

    println!("\n{}", "❌ CRITICAL FAILURES DETECTED:".red().bold());
    for failure in failures {
        println!("  - {}: {}", failure.name, failure.message);
        if !failure.details.is_empty() {
            println!("    {}", failure.details);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_uppercase() {
        let result = DeploymentCheckResult::new("DEPLOY-X", "x").pass("ok");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "PASS");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["details"], "");
    }

    #[test]
    fn test_skip_and_non_critical_failures_never_block() {
        let mut low = DeploymentCheckResult::new("D-2", "low").fail("bad", "");
        low.severity = Severity::Low;
        let report = DeploymentReport::new(vec![
            DeploymentCheckResult::new("D-1", "skipped").skip("no creds", ""),
            low,
        ]);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.failed, 1);

        let blocking = DeploymentReport::new(vec![
            DeploymentCheckResult::new("D-3", "critical").fail("down", "details"),
        ]);
        assert_eq!(blocking.exit_code(), 1);
    }

    #[test]
    fn test_timestamp_is_utc_seconds() {
        let report = DeploymentReport::new(Vec::new());
        assert_eq!(report.timestamp.len(), "2026-01-01T00:00:00Z".len());
        assert!(report.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_default_target() {
        let target = DeployTarget::default();
        assert_eq!(target.environment, "github-pages");
        assert_eq!(target.workflow, "deploy-pages.yml");
        assert_eq!(target.expected_content.len(), 2);
    }
}
