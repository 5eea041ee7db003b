//! GitHub credential discovery for the deployment checks.
//!
//! Order:
//! 1. `gh auth token` (only if the gh CLI is installed and logged in)
//! 2. GITHUB_TOKEN
//! 3. GH_TOKEN

use std::env;
use std::process::Command;

use octocrab::Octocrab;
use tracing::debug;

use crate::error::GitHubError;

/// Find a GitHub token, or fail with `AuthenticationFailed`.
pub fn get_github_token() -> Result<String, GitHubError> {
    if let Some(token) = get_token_from_gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var) {
            if !token.trim().is_empty() {
                debug!("Using GitHub token from {}", var);
                return Ok(token.trim().to_string());
            }
        }
    }

    Err(GitHubError::AuthenticationFailed)
}

fn get_token_from_gh_cli() -> Option<String> {
    let gh = which::which("gh").ok()?;

    let output = Command::new(gh).args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// Build an authenticated API client.
pub fn github_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::ClientFailed(Box::new(e)))
}
