//! Local development server for manual browser testing.
//!
//! Static files come from the document root; a few special routes are
//! matched first:
//!
//! | route | behaviour |
//! |---|---|
//! | `GET /favicon.ico` | one-byte icon stub |
//! | `GET /_clipboard/latest` | newest image in the clipboard directory |
//! | `GET /_clipboard/<file>` | file from the clipboard directory |
//! | `GET /repo/<path>` | any project file, with directory listings |
//! | `POST /_ingest/<endpoint>` | loopback-only diagnostic upload; 404 for unknown endpoints |

pub mod aliases;
pub mod ingest;
pub mod pidfile;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ProjectLayout;
use crate::error::ServerError;

pub use pidfile::{PidFile, stop_server};

/// Directories the server reads from and writes to.
#[derive(Debug, Clone)]
pub struct ServerPaths {
    pub document_root: PathBuf,
    pub clipboard_dir: PathBuf,
    pub repo_root: PathBuf,
    pub ingest_dir: PathBuf,
}

impl ServerPaths {
    pub fn from_layout(layout: &ProjectLayout) -> Self {
        Self {
            document_root: layout.document_root(),
            clipboard_dir: layout.clipboard_dir(),
            repo_root: layout.root().to_path_buf(),
            ingest_dir: layout.ingest_dir(),
        }
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ServerState {
    paths: Arc<ServerPaths>,
}

impl ServerState {
    pub fn new(paths: ServerPaths) -> Self {
        Self {
            paths: Arc::new(paths),
        }
    }

    pub fn paths(&self) -> &ServerPaths {
        &self.paths
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub paths: ServerPaths,
    pub bind: IpAddr,
    pub port: u16,
    pub pid_file: PathBuf,
}

impl ServerConfig {
    pub fn from_layout(layout: &ProjectLayout, port: u16) -> Self {
        Self {
            paths: ServerPaths::from_layout(layout),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
            pid_file: layout.pid_file(),
        }
    }
}

/// Build the router. Unmatched paths fall through to the document root.
pub fn router(state: ServerState) -> Router {
    let static_files = ServeDir::new(&state.paths().document_root);

    Router::new()
        .route("/favicon.ico", get(aliases::favicon))
        .route("/_clipboard/*rest", get(aliases::clipboard))
        .route("/repo/", get(aliases::repo))
        .route("/repo/*rest", get(aliases::repo))
        .route("/_ingest/", post(ingest::ingest))
        .route("/_ingest/*endpoint", post(ingest::ingest))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, record the PID, and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = SocketAddr::new(config.bind, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::BindFailed {
            addr: addr.to_string(),
            source,
        })?;

    let _pid = PidFile::create(&config.pid_file)?;

    info!(
        "Serving {} on http://localhost:{}/ (PID {})",
        config.paths.document_root.display(),
        config.port,
        std::process::id()
    );

    let app = router(ServerState::new(config.paths));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Dev server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
