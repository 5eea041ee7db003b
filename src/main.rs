//! qagate - CLI entry point.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qagate::catalog::load_catalog;
use qagate::checks::CheckContext;
use qagate::config::{self, ProjectLayout, Timeouts};
use qagate::deploy::{self, DeployTarget, DeploymentVerifier, auth};
use qagate::runner::QaRunner;
use qagate::server::{self, ServerConfig};
use qagate::tools::SystemToolRunner;

/// Run QA checks, verify deployments, and serve the front end locally.
#[derive(Parser, Debug)]
#[command(name = "qagate")]
#[command(about = "Project-local QA gate, deployment verifier and dev server")]
#[command(version)]
struct Cli {
    /// Project root all relative paths resolve against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every check in the requirement catalog
    Run(RunArgs),

    /// Verify the hosted deployment
    VerifyDeploy(DeployArgs),

    /// Serve the front end for manual testing
    Serve(ServeArgs),

    /// Stop a dev server started with `serve`
    Stop,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Record strict mode in the report (also enabled by QA_STRICT=1)
    #[arg(long)]
    strict: bool,

    /// Requirement catalog (JSON, or YAML by extension)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Where to write the run report
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DeployArgs {
    #[arg(long)]
    owner: Option<String>,

    #[arg(long)]
    repo: Option<String>,

    /// Deployment environment name
    #[arg(long)]
    environment: Option<String>,

    /// Live URL to check
    #[arg(long)]
    url: Option<String>,

    /// Workflow file name
    #[arg(long)]
    workflow: Option<String>,

    /// Literal the deployed page must contain (repeatable)
    #[arg(long = "expect")]
    expect: Vec<String>,

    /// Where to write the deployment report
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on (default: PM_LOCAL_PORT or 8080)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qagate=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let layout = ProjectLayout::new(&cli.root);
    match cli.command {
        Command::Run(args) => run_checks(&layout, args).await,
        Command::VerifyDeploy(args) => verify_deploy(&layout, args).await,
        Command::Serve(args) => serve(&layout, args).await,
        Command::Stop => stop(&layout),
    }
}

async fn run_checks(layout: &ProjectLayout, args: RunArgs) -> Result<ExitCode> {
    let strict = args.strict || config::strict_from_env();
    let catalog_path = resolve(layout.root(), args.catalog, layout.catalog());
    let report_path = resolve(layout.root(), args.report, layout.run_report());

    let catalog = load_catalog(&catalog_path).context("Failed to load requirement catalog")?;

    let tools = SystemToolRunner;
    let markup = layout.markup_file();
    let playwright_config = layout.playwright_config();
    let ctx = CheckContext {
        root: layout.root(),
        markup_file: &markup,
        playwright_config: &playwright_config,
        timeouts: Timeouts::from_env(),
        tools: &tools,
    };

    let report = QaRunner::new(ctx, strict).run(&catalog).await;
    report
        .export(&report_path)
        .context("Failed to export run report")?;
    println!("Report exported to: {}", report_path.display());

    Ok(ExitCode::from(report.overall_status().exit_code()))
}

async fn verify_deploy(layout: &ProjectLayout, args: DeployArgs) -> Result<ExitCode> {
    let defaults = DeployTarget::default();
    let target = DeployTarget {
        owner: args.owner.unwrap_or(defaults.owner),
        repo: args.repo.unwrap_or(defaults.repo),
        environment: args.environment.unwrap_or(defaults.environment),
        url: args.url.unwrap_or(defaults.url),
        workflow: args.workflow.unwrap_or(defaults.workflow),
        expected_content: if args.expect.is_empty() {
            defaults.expected_content
        } else {
            args.expect
        },
    };
    let report_path = resolve(layout.root(), args.report, layout.deployment_report());

    let github = match auth::get_github_token() {
        Ok(token) => Some(auth::github_client(&token)?),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };

    let verifier = DeploymentVerifier::new(target, github, Timeouts::from_env().http)
        .context("Failed to build HTTP client")?;
    let report = verifier.run().await;

    report
        .export(&report_path)
        .context("Failed to save deployment results")?;
    println!("\nResults saved to {}", report_path.display());
    deploy::print_outcome(&report);

    Ok(ExitCode::from(report.exit_code()))
}

async fn serve(layout: &ProjectLayout, args: ServeArgs) -> Result<ExitCode> {
    let port = args.port.unwrap_or_else(config::port_from_env);
    let mut config = ServerConfig::from_layout(layout, port);
    config.bind = args.bind;

    server::serve(config).await.context("Dev server failed")?;
    Ok(ExitCode::SUCCESS)
}

fn stop(layout: &ProjectLayout) -> Result<ExitCode> {
    match server::stop_server(&layout.pid_file()) {
        Ok(pid) => {
            println!("Signaled server PID {} to stop.", pid);
            Ok(ExitCode::SUCCESS)
        }
        Err(qagate::ServerError::NotRunning(_)) => {
            println!("No PID file found; server may not be running.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ qagate::ServerError::ProcessNotFound(_)) => {
            println!("{}", e);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Err(e).context("Could not stop dev server"),
    }
}

/// CLI paths are relative to the project root unless absolute.
fn resolve(root: &Path, given: Option<PathBuf>, default: PathBuf) -> PathBuf {
    match given {
        Some(path) if path.is_absolute() => path,
        Some(path) => root.join(path),
        None => default,
    }
}
