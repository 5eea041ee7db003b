//! Project layout and environment-driven settings.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

/// Environment variable that enables strict mode when set to `1`.
pub const STRICT_ENV_VAR: &str = "QA_STRICT";

/// Environment variable overriding the dev-server port.
pub const PORT_ENV_VAR: &str = "PM_LOCAL_PORT";

pub const DEFAULT_PORT: u16 = 8080;

const SYNTAX_TIMEOUT_ENV_VAR: &str = "QAGATE_SYNTAX_TIMEOUT";
const PYTEST_TIMEOUT_ENV_VAR: &str = "QAGATE_PYTEST_TIMEOUT";
const PLAYWRIGHT_TIMEOUT_ENV_VAR: &str = "QAGATE_PLAYWRIGHT_TIMEOUT";
const HTTP_TIMEOUT_ENV_VAR: &str = "QAGATE_HTTP_TIMEOUT";

const DEFAULT_SYNTAX_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PYTEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PLAYWRIGHT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Well-known locations inside the project being checked.
///
/// Every path is derived from the project root so the tools behave the same
/// regardless of the process working directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> PathBuf {
        self.root.join("qa").join("requirements.json")
    }

    pub fn run_report(&self) -> PathBuf {
        self.root.join("qa").join("last-run-report.json")
    }

    pub fn deployment_report(&self) -> PathBuf {
        self.root.join("qa").join("deployment-check-results.json")
    }

    /// HTML file scanned by `element_exists` and `testid_check`.
    pub fn markup_file(&self) -> PathBuf {
        self.root.join("src").join("frontend").join("index.html")
    }

    pub fn playwright_config(&self) -> PathBuf {
        self.root.join("tests").join("e2e").join("playwright.config.js")
    }

    pub fn document_root(&self) -> PathBuf {
        self.root.join("src").join("frontend")
    }

    pub fn clipboard_dir(&self) -> PathBuf {
        self.root.join("projects").join("_clipboard")
    }

    pub fn ingest_dir(&self) -> PathBuf {
        self.root.join("logs").join("ocr")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root.join("scripts").join(".pids").join("http-server.pid")
    }
}

/// Upper bounds for everything that can block a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub syntax_check: Duration,
    pub pytest: Duration,
    pub playwright: Duration,
    pub http: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            syntax_check: Duration::from_secs(DEFAULT_SYNTAX_TIMEOUT_SECS),
            pytest: Duration::from_secs(DEFAULT_PYTEST_TIMEOUT_SECS),
            playwright: Duration::from_secs(DEFAULT_PLAYWRIGHT_TIMEOUT_SECS),
            http: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Timeouts {
    /// Read timeouts from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            syntax_check: env_secs(SYNTAX_TIMEOUT_ENV_VAR, DEFAULT_SYNTAX_TIMEOUT_SECS),
            pytest: env_secs(PYTEST_TIMEOUT_ENV_VAR, DEFAULT_PYTEST_TIMEOUT_SECS),
            playwright: env_secs(PLAYWRIGHT_TIMEOUT_ENV_VAR, DEFAULT_PLAYWRIGHT_TIMEOUT_SECS),
            http: env_secs(HTTP_TIMEOUT_ENV_VAR, DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Whether `QA_STRICT=1` is set.
pub fn strict_from_env() -> bool {
    matches!(env::var(STRICT_ENV_VAR), Ok(v) if v == "1")
}

/// Dev-server port from `PM_LOCAL_PORT`, or the default.
///
/// Logs a warning if the variable is set but not a valid port.
pub fn port_from_env() -> u16 {
    match env::var(PORT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}",
                    PORT_ENV_VAR, v, DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        },
        _ => DEFAULT_PORT,
    }
}

fn env_secs(var: &str, default_secs: u64) -> Duration {
    match env::var(var) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}s", var, v, default_secs);
                Duration::from_secs(default_secs)
            }
        },
        _ => Duration::from_secs(default_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths_are_rooted() {
        let layout = ProjectLayout::new("/work/project");
        assert_eq!(
            layout.catalog(),
            PathBuf::from("/work/project/qa/requirements.json")
        );
        assert_eq!(
            layout.markup_file(),
            PathBuf::from("/work/project/src/frontend/index.html")
        );
        assert_eq!(
            layout.pid_file(),
            PathBuf::from("/work/project/scripts/.pids/http-server.pid")
        );
    }

    #[test]
    fn test_strict_requires_exactly_one() {
        temp_env::with_var(STRICT_ENV_VAR, Some("1"), || {
            assert!(strict_from_env());
        });
        temp_env::with_var(STRICT_ENV_VAR, Some("true"), || {
            assert!(!strict_from_env());
        });
        temp_env::with_var_unset(STRICT_ENV_VAR, || {
            assert!(!strict_from_env());
        });
    }

    #[test]
    fn test_port_default_and_override() {
        temp_env::with_var_unset(PORT_ENV_VAR, || {
            assert_eq!(port_from_env(), DEFAULT_PORT);
        });
        temp_env::with_var(PORT_ENV_VAR, Some("9191"), || {
            assert_eq!(port_from_env(), 9191);
        });
        temp_env::with_var(PORT_ENV_VAR, Some("not_a_port"), || {
            assert_eq!(port_from_env(), DEFAULT_PORT);
        });
    }

    #[test]
    fn test_timeouts_from_env() {
        temp_env::with_vars(
            [
                (PYTEST_TIMEOUT_ENV_VAR, Some("15")),
                (HTTP_TIMEOUT_ENV_VAR, Some("")),
                (SYNTAX_TIMEOUT_ENV_VAR, Some("abc")),
            ],
            || {
                let timeouts = Timeouts::from_env();
                assert_eq!(timeouts.pytest, Duration::from_secs(15));
                assert_eq!(timeouts.http, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
                assert_eq!(
                    timeouts.syntax_check,
                    Duration::from_secs(DEFAULT_SYNTAX_TIMEOUT_SECS)
                );
            },
        );
    }
}
