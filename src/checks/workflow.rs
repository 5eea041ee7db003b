//! CI workflow configuration predicates.
//!
//! YAML 1.1 loaders read a bare `on:` key as boolean `true`, so the trigger
//! block is looked up under both the string and the boolean key.

use std::path::Path;

use serde_yaml::Value;

use super::CheckOutcome;

/// Pass iff the workflow's push trigger lists `expected_branch`.
pub fn branch_configured(root: &Path, target: &str, expected_branch: &str) -> CheckOutcome {
    let workflow = match load_workflow(root, target) {
        Ok(w) => w,
        Err(LoadFailure::Missing) => {
            return CheckOutcome::fail(format!("Workflow file not found: {}", target));
        }
        Err(LoadFailure::Invalid(e)) => {
            return CheckOutcome::fail(format!("Error checking workflow: {}", e));
        }
    };

    let branches = trigger_block(&workflow)
        .and_then(|on| on.get("push"))
        .and_then(|push| push.get("branches"));

    if branches.is_some_and(|b| lists_branch(b, expected_branch)) {
        CheckOutcome::pass(format!("Workflow configured for branch '{}'", expected_branch))
    } else {
        CheckOutcome::fail(format!(
            "Workflow not configured for branch '{}'",
            expected_branch
        ))
    }
}

/// Pass iff a deployment job declares `expected_env` as its environment.
///
/// A job is a deployment job when its name contains "deploy" in any case.
/// The environment may be a plain string or a mapping with a `name` key.
pub fn environment_configured(root: &Path, target: &str, expected_env: &str) -> CheckOutcome {
    let workflow = match load_workflow(root, target) {
        Ok(w) => w,
        Err(LoadFailure::Missing) => {
            return CheckOutcome::fail(format!("Workflow file not found: {}", target));
        }
        Err(LoadFailure::Invalid(e)) => {
            return CheckOutcome::fail(format!("Error checking workflow environment: {}", e));
        }
    };

    let jobs = match workflow.get("jobs").and_then(Value::as_mapping) {
        Some(jobs) if !jobs.is_empty() => jobs,
        _ => return CheckOutcome::fail(format!("No jobs found in workflow: {}", target)),
    };

    let deploy_jobs: Vec<(&str, &Value)> = jobs
        .iter()
        .filter_map(|(name, config)| name.as_str().map(|n| (n, config)))
        .filter(|(name, _)| name.to_lowercase().contains("deploy"))
        .collect();

    if deploy_jobs.is_empty() {
        return CheckOutcome::fail(format!("No deployment job found in workflow: {}", target));
    }

    for (name, config) in deploy_jobs {
        if environment_name(config) == Some(expected_env) {
            return CheckOutcome::pass(format!(
                "Deployment job '{}' has environment '{}'",
                name, expected_env
            ));
        }
    }

    CheckOutcome::fail(format!(
        "Deployment job missing environment configuration. Expected: '{}'",
        expected_env
    ))
}

enum LoadFailure {
    Missing,
    Invalid(String),
}

fn load_workflow(root: &Path, target: &str) -> Result<Value, LoadFailure> {
    let path = root.join(target);
    if !path.exists() {
        return Err(LoadFailure::Missing);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| LoadFailure::Invalid(e.to_string()))?;
    serde_yaml::from_str(&content).map_err(|e| LoadFailure::Invalid(e.to_string()))
}

/// The `on:` block, whichever way the loader keyed it.
fn trigger_block(workflow: &Value) -> Option<&Value> {
    let mapping = workflow.as_mapping()?;
    mapping
        .get(Value::Bool(true))
        .or_else(|| mapping.get("on"))
}

fn lists_branch(branches: &Value, expected: &str) -> bool {
    match branches {
        Value::Sequence(items) => items.iter().any(|b| b.as_str() == Some(expected)),
        Value::String(single) => single == expected,
        _ => false,
    }
}

fn environment_name(job: &Value) -> Option<&str> {
    let env = job.get("environment")?;
    match env {
        Value::String(name) => Some(name.as_str()),
        Value::Mapping(_) => env.get("name").and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PAGES_WORKFLOW: &str = r#"
name: Deploy
on:
  push:
    branches: [main, release]
  workflow_dispatch:
jobs:
  build:
    runs-on: ubuntu-latest
  deploy:
    needs: build
    environment:
      name: github-pages
      url: ${{ steps.deployment.outputs.page_url }}
"#;

    fn write_workflow(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let wf = dir.path().join(".github/workflows");
        fs::create_dir_all(&wf).unwrap();
        fs::write(wf.join("deploy.yml"), content).unwrap();
        dir
    }

    const TARGET: &str = ".github/workflows/deploy.yml";

    #[test]
    fn test_branch_found_under_plain_on_key() {
        let dir = write_workflow(PAGES_WORKFLOW);
        let outcome = branch_configured(dir.path(), TARGET, "main");
        assert!(outcome.passed, "{}", outcome.message);
        assert_eq!(outcome.message, "Workflow configured for branch 'main'");
    }

    #[test]
    fn test_branch_found_under_boolean_trigger_key() {
        let dir = write_workflow("true:\n  push:\n    branches: [main]\n");
        assert!(branch_configured(dir.path(), TARGET, "main").passed);
    }

    #[test]
    fn test_trigger_block_accepts_boolean_key() {
        let mut push = serde_yaml::Mapping::new();
        push.insert(Value::from("branches"), Value::from(vec!["main"]));
        let mut on = serde_yaml::Mapping::new();
        on.insert(Value::from("push"), Value::Mapping(push));
        let mut workflow = serde_yaml::Mapping::new();
        workflow.insert(Value::Bool(true), Value::Mapping(on));
        let workflow = Value::Mapping(workflow);

        let block = trigger_block(&workflow).expect("boolean key should be found");
        let branches = block.get("push").and_then(|p| p.get("branches")).unwrap();
        assert!(lists_branch(branches, "main"));
    }

    #[test]
    fn test_branch_found_under_quoted_on_key() {
        let dir = write_workflow("\"on\":\n  push:\n    branches: main\n");
        assert!(branch_configured(dir.path(), TARGET, "main").passed);
    }

    #[test]
    fn test_branch_missing() {
        let dir = write_workflow(PAGES_WORKFLOW);
        let outcome = branch_configured(dir.path(), TARGET, "develop");
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Workflow not configured for branch 'develop'");

        let push_only = write_workflow("on: push\n");
        assert!(!branch_configured(push_only.path(), TARGET, "main").passed);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = branch_configured(dir.path(), TARGET, "main");
        assert_eq!(missing.message, format!("Workflow file not found: {}", TARGET));

        let broken = write_workflow("on: [unclosed\n");
        let outcome = branch_configured(broken.path(), TARGET, "main");
        assert!(!outcome.passed);
        assert!(outcome.message.starts_with("Error checking workflow:"));
    }

    #[test]
    fn test_environment_mapping_form() {
        let dir = write_workflow(PAGES_WORKFLOW);
        let outcome = environment_configured(dir.path(), TARGET, "github-pages");
        assert!(outcome.passed, "{}", outcome.message);
        assert_eq!(outcome.message, "Deployment job 'deploy' has environment 'github-pages'");
    }

    #[test]
    fn test_environment_string_form_and_mismatch() {
        let dir = write_workflow("jobs:\n  Deploy-Site:\n    environment: staging\n");
        assert!(environment_configured(dir.path(), TARGET, "staging").passed);

        let outcome = environment_configured(dir.path(), TARGET, "github-pages");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("missing environment configuration"));
    }

    #[test]
    fn test_environment_without_jobs_or_deploy_job() {
        let no_jobs = write_workflow("on: push\n");
        let outcome = environment_configured(no_jobs.path(), TARGET, "github-pages");
        assert!(outcome.message.starts_with("No jobs found"));

        let no_deploy = write_workflow("jobs:\n  test:\n    runs-on: ubuntu-latest\n");
        let outcome = environment_configured(no_deploy.path(), TARGET, "github-pages");
        assert!(outcome.message.starts_with("No deployment job found"));
    }
}
