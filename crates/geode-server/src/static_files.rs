//! Static file serving from the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::state::AppState;

/// Map a request path to a file under `root`.
///
/// `/` maps to `index.html`, a directory to its `index.html`, and an
/// extensionless path to `<path>.html` when that file exists. Paths
/// containing `..` or not valid UTF-8 after decoding resolve to nothing.
pub(crate) fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    if decoded.contains("..") || decoded.contains('\\') {
        return None;
    }

    let relative = decoded.trim_start_matches('/');
    if relative.is_empty() {
        return Some(root.join("index.html"));
    }

    let candidate = root.join(relative);
    if candidate.is_dir() {
        return Some(candidate.join("index.html"));
    }
    if Path::new(relative).extension().is_none() {
        let page = root.join(format!("{relative}.html"));
        if page.is_file() {
            return Some(page);
        }
    }
    Some(candidate)
}

/// Serve a file from the output directory, or 404.
pub(crate) async fn serve_file(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let Some(path) = resolve_path(&state.output_dir, uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], content).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
