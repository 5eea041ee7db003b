//! Run results, overall status and report export.

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::catalog::Severity;
use crate::error::ReportError;

/// Outcome of one check in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
}

/// Counts over every executed check.
///
/// `skipped` is always zero for QA runs; it is kept so the report shape
/// matches the deployment report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Severity-weighted verdict for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Green,
    Amber,
    Red,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Amber => "AMBER",
            Self::Red => "RED",
        }
    }

    /// Only RED blocks; AMBER and GREEN both exit successfully.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Amber | Self::Green => 0,
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run produced, in catalog order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub timestamp: String,
    pub strict_mode: bool,
    #[serde(serialize_with = "serialize_ordered")]
    pub checks: Vec<(String, Vec<CheckResult>)>,
    pub summary: Summary,
}

impl RunReport {
    pub fn new(timestamp: impl Into<String>, strict_mode: bool) -> Self {
        Self {
            timestamp: timestamp.into(),
            strict_mode,
            checks: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Append a category's results and fold them into the summary.
    pub fn push_category(&mut self, name: impl Into<String>, results: Vec<CheckResult>) {
        for result in &results {
            self.summary.record(result.passed);
        }
        self.checks.push((name.into(), results));
    }

    pub fn results(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().flat_map(|(_, results)| results.iter())
    }

    /// RED if any critical check failed, AMBER if anything else failed,
    /// GREEN otherwise. The number of non-critical failures never matters.
    pub fn overall_status(&self) -> OverallStatus {
        overall_status(self.results())
    }

    /// Write the report as pretty JSON, replacing any previous report.
    ///
    /// The document is written to a temporary file beside `path` and then
    /// renamed, so readers never observe a partial report.
    pub fn export(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self).map_err(ReportError::SerializeFailed)?;
        write_atomically(path, json.as_bytes())?;
        debug!("Wrote run report to {}", path.display());
        Ok(())
    }
}

/// Fold a sequence of results into the overall status.
pub fn overall_status<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> OverallStatus {
    let mut any_failed = false;
    for result in results {
        if result.passed {
            continue;
        }
        if result.severity.is_critical() {
            return OverallStatus::Red;
        }
        any_failed = true;
    }
    if any_failed {
        OverallStatus::Amber
    } else {
        OverallStatus::Green
    }
}

/// Replace `path` with `contents` via a same-directory temp file and rename.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let write_err = |source| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.persist(path).map_err(|source| ReportError::PersistFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn serialize_ordered<S>(checks: &[(String, Vec<CheckResult>)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(checks.len()))?;
    for (category, results) in checks {
        map.serialize_entry(category, results)?;
    }
    map.end()
}
