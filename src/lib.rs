//! qagate - project-local quality gate.
//!
//! # Overview
//!
//! qagate runs a declarative catalog of checks (files, JSON, JS syntax, tests,
//! documentation, secrets, CI workflow configuration) and folds the results
//! into a GREEN/AMBER/RED status. It also verifies a hosted deployment against
//! GitHub and the live URL, and serves the front end locally for manual
//! browser testing.

pub mod catalog;
pub mod checks;
pub mod config;
pub mod deploy;
pub mod error;
pub mod runner;
pub mod server;
pub mod tools;

// Re-export commonly used types
pub use catalog::{Catalog, Check, CheckKind, Severity, load_catalog};
pub use checks::{CheckContext, CheckOutcome, run_check};
pub use config::{ProjectLayout, Timeouts};
pub use deploy::{DeployStatus, DeployTarget, DeploymentCheckResult, DeploymentReport, DeploymentVerifier};
pub use error::{CatalogError, GitHubError, IngestError, ReportError, ServerError, SiteError, ToolError};
pub use runner::{CheckResult, OverallStatus, QaRunner, RunReport, Summary};
