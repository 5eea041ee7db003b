//! Deployment checks backed by the GitHub REST API.

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GitHubError;

use super::{DeployTarget, DeploymentCheckResult};

pub const ENVIRONMENT_CHECK: (&str, &str) = (
    "DEPLOY-007",
    "GitHub Pages environment allows main branch deployment",
);
pub const WORKFLOW_CHECK: (&str, &str) = ("DEPLOY-008", "Latest deployment workflow run succeeded");
pub const DEPLOYMENT_CHECK: (&str, &str) = ("DEPLOY-011", "GitHub deployment status is Active");

#[derive(Debug, Deserialize)]
struct Environment {
    #[serde(default)]
    deployment_branch_policy: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowRun {
    conclusion: Option<String>,
    status: Option<String>,
    head_branch: Option<String>,
    display_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Deployment {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct DeploymentState {
    state: String,
}

#[derive(Debug, Serialize)]
struct ListParams<'a> {
    per_page: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
}

impl<'a> ListParams<'a> {
    fn latest() -> Self {
        Self {
            per_page: 1,
            environment: None,
        }
    }
}

/// GET `route` and decode the body, classifying API failures.
async fn get_json<T, P>(client: &Octocrab, route: &str, params: Option<&P>) -> Result<T, GitHubError>
where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
{
    debug!("GET {}", route);
    client
        .get::<T, _, P>(route, params)
        .await
        .map_err(|e| classify(route, e))
}

/// Map an octocrab failure onto the error enum.
///
/// Octocrab reports GitHub's status only through its message text, so both
/// Display and Debug output are inspected.
fn classify(route: &str, e: octocrab::Error) -> GitHubError {
    let display = e.to_string();
    let debug = format!("{:?}", e);

    if display.to_lowercase().contains("rate limit") || debug.to_lowercase().contains("rate limit") {
        return GitHubError::RateLimited;
    }
    if display.contains("Not Found") || debug.contains("Not Found") {
        return GitHubError::NotFound(route.to_string());
    }
    if display.contains("Bad credentials") || debug.contains("Bad credentials") {
        return GitHubError::AuthenticationFailed;
    }
    GitHubError::RequestFailed {
        route: route.to_string(),
        source: Box::new(e),
    }
}

fn repo_route(target: &DeployTarget, rest: &str) -> String {
    format!("/repos/{}/{}/{}", target.owner, target.repo, rest)
}

/// DEPLOY-007: the deployment environment restricts which branches may deploy.
///
/// A missing environment is not a failure; the first deployment creates it.
pub async fn check_environment(client: &Octocrab, target: &DeployTarget) -> DeploymentCheckResult {
    let (id, name) = ENVIRONMENT_CHECK;
    let result = DeploymentCheckResult::new(id, name);

    let route = repo_route(target, &format!("environments/{}", target.environment));
    let env: Environment = match get_json(client, &route, None::<&()>).await {
        Ok(env) => env,
        Err(e) => {
            return result.skip(
                format!("Could not retrieve environment configuration: {}", e),
                "Environment may not exist yet or credentials lack access. First deployment will create it.",
            );
        }
    };

    match env.deployment_branch_policy {
        Some(policy) if policy.is_object() => {
            debug!("Deployment branch policy: {}", policy);
            result.pass("Environment deployment policy configured")
        }
        _ => result.fail(
            "Environment deployment policy may block main branch",
            format!(
                "Go to Settings → Environments → {} and ensure main branch is in allowed branches",
                target.environment
            ),
        ),
    }
}

/// DEPLOY-008: the most recent run of the deployment workflow succeeded.
pub async fn check_workflow_run(client: &Octocrab, target: &DeployTarget) -> DeploymentCheckResult {
    let (id, name) = WORKFLOW_CHECK;
    let result = DeploymentCheckResult::new(id, name);

    let route = repo_route(target, &format!("actions/workflows/{}/runs", target.workflow));
    let runs: WorkflowRuns = match get_json(client, &route, Some(&ListParams::latest())).await {
        Ok(runs) => runs,
        Err(e) => {
            return result.fail(format!("Could not retrieve workflow runs: {}", e), "");
        }
    };

    let Some(run) = runs.workflow_runs.into_iter().next() else {
        return result.skip(format!("No workflow runs found for {}", target.workflow), "");
    };

    let conclusion = run.conclusion.unwrap_or_default();
    let status = run.status.unwrap_or_default();
    let branch = run.head_branch.unwrap_or_default();
    let title = run.display_title.unwrap_or_default();

    if conclusion == "success" {
        return result.pass(format!("Latest workflow run succeeded ({}: {})", branch, title));
    }
    if status == "in_progress" || status == "queued" {
        return result.skip(
            format!("Workflow is currently {}", status),
            "Wait for the workflow to complete",
        );
    }

    let outcome = if conclusion.is_empty() { &status } else { &conclusion };
    result.fail(
        format!("Latest workflow run {} ({}: {})", outcome, branch, title),
        format!(
            "Check GitHub Actions logs for details. Run status: {}, conclusion: {}",
            status, conclusion
        ),
    )
}

/// DEPLOY-011: the newest deployment record for the environment is successful.
pub async fn check_deployment_status(
    client: &Octocrab,
    target: &DeployTarget,
) -> DeploymentCheckResult {
    let (id, name) = DEPLOYMENT_CHECK;
    let result = DeploymentCheckResult::new(id, name);

    let params = ListParams {
        per_page: 1,
        environment: Some(&target.environment),
    };
    let route = repo_route(target, "deployments");
    let deployments: Vec<Deployment> = match get_json(client, &route, Some(&params)).await {
        Ok(list) => list,
        Err(e) => {
            warn!("Listing deployments failed: {}", e);
            Vec::new()
        }
    };

    let Some(deployment) = deployments.first() else {
        return result.skip(
            format!("No deployments found for {} environment", target.environment),
            "First deployment will create the deployment record",
        );
    };

    let route = repo_route(target, &format!("deployments/{}/statuses", deployment.id));
    let statuses: Vec<DeploymentState> =
        match get_json(client, &route, Some(&ListParams::latest())).await {
            Ok(list) => list,
            Err(e) => {
                return result.skip("Could not retrieve deployment status", e.to_string());
            }
        };

    match statuses.first().map(|s| s.state.as_str()) {
        Some("success") => result.pass("GitHub deployment status is active/success"),
        Some(state) => result.fail(
            format!("GitHub deployment status is {}", state),
            "Deployment may have failed or is still in progress",
        ),
        None => result.skip("Deployment has no status records yet", ""),
    }
}

/// SKIP result for an API check when no credentials are available.
pub fn without_credentials(id: &str, name: &str, what: &str) -> DeploymentCheckResult {
    DeploymentCheckResult::new(id, name).skip(
        format!("GitHub credentials not available - skipping {} check", what),
        "Run 'gh auth login' or set GITHUB_TOKEN to enable API checks",
    )
}
