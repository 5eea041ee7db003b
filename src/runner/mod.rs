//! Sequential execution of a requirement catalog.

pub mod console;
pub mod report;

use chrono::Local;
use tracing::{debug, info};

use crate::catalog::{Catalog, Check};
use crate::checks::{CheckContext, run_check};

pub use report::{CheckResult, OverallStatus, RunReport, Summary, overall_status};

/// Drives a catalog through the check dispatcher.
pub struct QaRunner<'a> {
    ctx: CheckContext<'a>,
    strict_mode: bool,
    echo: bool,
}

impl<'a> QaRunner<'a> {
    pub fn new(ctx: CheckContext<'a>, strict_mode: bool) -> Self {
        Self {
            ctx,
            strict_mode,
            echo: true,
        }
    }

    /// Suppress console output.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Run every check in catalog order.
    ///
    /// Categories without a `checks` list are skipped. A failing check
    /// never stops the run.
    pub async fn run(&self, catalog: &Catalog) -> RunReport {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let mut report = RunReport::new(timestamp, self.strict_mode);

        if self.echo {
            console::print_header(&report.timestamp, self.strict_mode);
        }

        for (name, category) in catalog.categories() {
            let Some(checks) = &category.checks else {
                debug!("Category '{}' has no checks, skipping", name);
                continue;
            };

            if self.echo {
                console::print_category(&category.description);
            }

            let mut results = Vec::with_capacity(checks.len());
            for check in checks {
                let result = self.execute(check).await;
                if self.echo {
                    console::print_result(&result);
                }
                results.push(result);
            }
            report.push_category(name, results);
        }

        info!(
            "QA run finished: {} passed, {} failed, status {}",
            report.summary.passed,
            report.summary.failed,
            report.overall_status()
        );

        if self.echo {
            console::print_summary(&report);
        }

        report
    }

    async fn execute(&self, check: &Check) -> CheckResult {
        let outcome = run_check(check, &self.ctx).await;
        CheckResult {
            id: check.id.clone(),
            name: check.name.clone(),
            severity: check.severity,
            passed: outcome.passed,
            message: outcome.message,
        }
    }
}
