//! Read-only GET routes: favicon stub, clipboard alias, repository alias.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use axum::body::Body;
use axum::extract::{Path as UrlPath, Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use super::ServerState;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// One zero byte served as `image/x-icon`.
pub async fn favicon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/x-icon")], vec![0u8])
}

/// `/_clipboard/latest` or `/_clipboard/<file>`.
pub async fn clipboard(
    State(state): State<ServerState>,
    UrlPath(rel): UrlPath<String>,
    req: Request,
) -> Response {
    let dir = &state.paths().clipboard_dir;

    if rel.trim_end_matches('/') == "latest" {
        if !dir.is_dir() {
            return not_found("Clipboard directory not found");
        }
        return match latest_image(dir) {
            Some(path) => serve_file(&path, req).await,
            None => not_found("No clipboard images found"),
        };
    }

    match resolve_within(dir, &rel) {
        Some(path) if path.is_file() => serve_file(&path, req).await,
        _ => not_found("File not found"),
    }
}

/// `/repo/<path>`: any file in the project, with directory listings.
pub async fn repo(
    State(state): State<ServerState>,
    rel: Option<UrlPath<String>>,
    req: Request,
) -> Response {
    let rel = rel.map(|UrlPath(rel)| rel).unwrap_or_default();
    let root = &state.paths().repo_root;

    let Some(path) = resolve_within(root, &rel) else {
        return not_found("File not found");
    };

    if path.is_dir() {
        let uri = req.uri().clone();
        if !uri.path().ends_with('/') {
            return redirect_to_slash(&uri);
        }
        let index = path.join("index.html");
        if index.is_file() {
            return serve_file(&index, req).await;
        }
        return match directory_listing(&path, uri.path()) {
            Ok(html) => Html(html).into_response(),
            Err(e) => (StatusCode::NOT_FOUND, format!("No permission to list directory: {}", e))
                .into_response(),
        };
    }

    if path.is_file() {
        serve_file(&path, req).await
    } else {
        not_found("File not found")
    }
}

/// Join `rel` onto `base`, refusing anything that resolves outside `base`.
///
/// Returns `None` when the path does not exist.
pub fn resolve_within(base: &Path, rel: &str) -> Option<PathBuf> {
    let base = base.canonicalize().ok()?;
    let candidate = base.join(rel.trim_start_matches('/')).canonicalize().ok()?;
    if candidate.starts_with(&base) {
        Some(candidate)
    } else {
        debug!("Refusing path outside {}: {}", base.display(), rel);
        None
    }
}

/// Newest image in `dir` by modification time.
pub fn latest_image(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _): &(SystemTime, PathBuf)| *modified)
        .map(|(_, path)| path)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

async fn serve_file(path: &Path, req: Request) -> Response {
    match ServeFile::new(path).oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

fn redirect_to_slash(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(q) => format!("{}/?{}", uri.path(), q),
        None => format!("{}/", uri.path()),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

/// HTML listing of `dir`, sorted case-insensitively, directories suffixed `/`.
pub fn directory_listing(dir: &Path, url_path: &str) -> std::io::Result<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| {
            let mut name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() {
                name.push('/');
            }
            name
        })
        .collect();
    names.sort_by_key(|name| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(url_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for name in &names {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_href(name),
            escape_html(name)
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn encode_href(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
