//! Write-only diagnostic ingest: `POST /_ingest/<endpoint>`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Local;
use tracing::{info, warn};

use crate::error::IngestError;

use super::ServerState;

/// Largest accepted payload.
pub const MAX_INGEST_BYTES: usize = 1024 * 1024;

/// Recognised sub-routes and the files each writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestKind {
    ClipOcr,
    UiDiagnostics,
}

impl IngestKind {
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        match endpoint {
            "clip-ocr" => Some(Self::ClipOcr),
            "ui-diagnostics" => Some(Self::UiDiagnostics),
            _ => None,
        }
    }

    pub fn timestamped_name(&self, ts: &str) -> String {
        match self {
            Self::ClipOcr => format!("clip-ocr-{}.txt", ts),
            Self::UiDiagnostics => format!("ui-{}.json", ts),
        }
    }

    pub fn latest_name(&self) -> &'static str {
        match self {
            Self::ClipOcr => "latest.txt",
            Self::UiDiagnostics => "ui-latest.json",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match &self {
            IngestError::Forbidden => StatusCode::FORBIDDEN,
            IngestError::InvalidLength => StatusCode::BAD_REQUEST,
            IngestError::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
            IngestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Accept a payload from a loopback client and persist it.
///
/// Checks run in order: client address (403), payload size (400), then
/// sub-route (404). Nothing is written unless all pass.
pub async fn ingest(
    State(state): State<ServerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    endpoint: Option<UrlPath<String>>,
    headers: HeaderMap,
    body: Body,
) -> Result<&'static str, IngestError> {
    if !peer.ip().to_canonical().is_loopback() {
        warn!("Rejected ingest from non-loopback client {}", peer);
        return Err(IngestError::Forbidden);
    }

    if let Some(declared) = declared_length(&headers) {
        if declared == 0 || declared > MAX_INGEST_BYTES {
            return Err(IngestError::InvalidLength);
        }
    }
    let payload = to_bytes(body, MAX_INGEST_BYTES)
        .await
        .map_err(|_| IngestError::InvalidLength)?;
    if payload.is_empty() {
        return Err(IngestError::InvalidLength);
    }

    let endpoint = endpoint.map(|UrlPath(e)| e).unwrap_or_default();
    let kind = IngestKind::from_endpoint(&endpoint)
        .ok_or_else(|| IngestError::UnknownEndpoint(endpoint.clone()))?;

    let written = store(&state.paths().ingest_dir, kind, &payload).await?;
    info!("Ingested {} bytes into {}", payload.len(), written.display());
    Ok("OK")
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Write the payload to a timestamped file, then overwrite the latest file.
pub async fn store(dir: &Path, kind: IngestKind, payload: &[u8]) -> Result<PathBuf, IngestError> {
    tokio::fs::create_dir_all(dir).await?;
    let ts = Local::now().format("%Y%m%d-%H%M%S-%6f").to_string();
    let path = dir.join(kind.timestamped_name(&ts));
    tokio::fs::write(&path, payload).await?;
    tokio::fs::write(dir.join(kind.latest_name()), payload).await?;
    Ok(path)
}
