//! Error types for qagate modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the requirement catalog. Always fatal for a run.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },
}

/// Errors from exporting a run report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Failed to write report {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move report into place at {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Errors from invoking an external tool (node, pytest, npx).
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0} is not installed or not on PATH")]
    NotInstalled(String),

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs} seconds")]
    Timeout { program: String, secs: u64 },
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to build GitHub client: {0}")]
    ClientFailed(#[source] Box<octocrab::Error>),

    #[error("GitHub API request {route} failed: {source}")]
    RequestFailed {
        route: String,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Rate limited by GitHub API")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors from requesting a live URL.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Errors from running or stopping the dev server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PID file {path}: {content:?}")]
    InvalidPidFile { path: PathBuf, content: String },

    #[error("No PID file found at {0}; server may not be running")]
    NotRunning(PathBuf),

    #[error("No process with PID {0}; removed stale PID file")]
    ProcessNotFound(u32),

    #[error("Could not stop PID {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },
}

/// Rejections from the dev server's ingest endpoint.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid content length")]
    InvalidLength,

    #[error("Unknown ingest endpoint")]
    UnknownEndpoint(String),

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
}
