//! Live-site checks: reachability and expected content.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::SiteError;

use super::DeploymentCheckResult;

pub const REACHABILITY_CHECK: (&str, &str) = ("DEPLOY-009", "Live deployment URL is accessible");
pub const CONTENT_CHECK: (&str, &str) = (
    "DEPLOY-010",
    "Deployed application contains expected content",
);

/// HTTP client for the live-site checks. Redirects are followed.
pub fn http_client(timeout: Duration) -> Result<Client, SiteError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("qagate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SiteError::Transport)
}

fn request_error(e: reqwest::Error, timeout: Duration) -> SiteError {
    if e.is_timeout() {
        SiteError::Timeout(timeout.as_secs())
    } else {
        SiteError::Transport(e)
    }
}

async fn fetch_status(client: &Client, url: &str, timeout: Duration) -> Result<StatusCode, SiteError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(e, timeout))?;
    Ok(response.status())
}

async fn fetch_body(client: &Client, url: &str, timeout: Duration) -> Result<String, SiteError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(e, timeout))?;
    response.text().await.map_err(|e| request_error(e, timeout))
}

/// DEPLOY-009: the URL answers with exactly HTTP 200.
pub async fn check_reachability(client: &Client, url: &str, timeout: Duration) -> DeploymentCheckResult {
    let (id, name) = REACHABILITY_CHECK;
    let result = DeploymentCheckResult::new(id, name);
    let guidance = "The GitHub Pages deployment may not have completed successfully or CDN \
                    propagation is still in progress. Wait 2-5 minutes and try again.";

    match fetch_status(client, url, timeout).await {
        Ok(StatusCode::OK) => result.pass(format!("URL {} is accessible (HTTP 200)", url)),
        Ok(status) => result.fail(
            format!("URL {} returned HTTP {}", url, status.as_u16()),
            guidance,
        ),
        Err(e) => {
            debug!("Reachability request failed: {}", e);
            result.fail(
                format!("URL {} returned HTTP connection failed ({})", url, e),
                guidance,
            )
        }
    }
}

/// DEPLOY-010: every expected literal appears in the page body.
pub async fn check_content(
    client: &Client,
    url: &str,
    expected: &[String],
    timeout: Duration,
) -> DeploymentCheckResult {
    let (id, name) = CONTENT_CHECK;
    let result = DeploymentCheckResult::new(id, name);

    let body = match fetch_body(client, url, timeout).await {
        Ok(body) => body,
        Err(e) => return result.fail("Failed to retrieve page content", e.to_string()),
    };

    let missing = missing_content(&body, expected);
    if missing.is_empty() {
        result.pass("All expected content found in deployed page")
    } else {
        result.fail(
            format!("Missing expected content: {}", missing.join(", ")),
            "The deployed page does not contain all expected test IDs and content. This may \
             indicate an incorrect artifact upload path or Jekyll processing issues.",
        )
    }
}

/// Expected literals absent from `body`, in the order given.
pub fn missing_content<'a>(body: &str, expected: &'a [String]) -> Vec<&'a str> {
    expected
        .iter()
        .filter(|needle| !body.contains(needle.as_str()))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_preserves_order() {
        let expected = vec![
            "TID-SHELL-ROOT".to_string(),
            "Tracker".to_string(),
            "TID-NAV".to_string(),
        ];
        let body = r#"<div data-testid="TID-SHELL-ROOT">Tracker</div>"#;
        assert_eq!(missing_content(body, &expected), vec!["TID-NAV"]);
        assert!(missing_content(body, &expected[..2]).is_empty());
    }
}
