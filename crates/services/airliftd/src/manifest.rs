//! Installation manifest and static passthrough handlers.
//!
//! The manifest response is byte-sensitive: the installing client rejects
//! the descriptor unless the content type matches exactly, and the cache
//! headers must force a re-fetch on every install attempt. The file is
//! re-read from disk per request; nothing is cached in memory.

use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::GatewayState;

/// Headers the installing client requires on the manifest response.
const MANIFEST_HEADERS: [(header::HeaderName, &str); 5] = [
    (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
];

/// Serve the installation manifest with the exact header set the installing
/// client expects.
pub async fn manifest(State(state): State<GatewayState>) -> Response {
    let path = state.config.public_dir.join("manifest.plist");
    match tokio::fs::read(&path).await {
        Ok(body) => {
            let mut response = Response::new(body.into());
            let headers = response.headers_mut();
            for (name, value) in MANIFEST_HEADERS {
                headers.insert(name, HeaderValue::from_static(value));
            }
            response
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "manifest.plist not found").into_response()
        }
        Err(err) => {
            error!("Failed to read {}: {err}", path.display());
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read manifest.plist").into_response()
        }
    }
}

/// Serve the installation page.
pub async fn index(State(state): State<GatewayState>) -> Response {
    serve_file(&state.config.public_dir, Path::new("index.html")).await
}

/// Static passthrough for everything else under the public directory.
pub async fn static_file(State(state): State<GatewayState>, uri: Uri) -> Response {
    let Some(relative) = sanitize(uri.path().trim_start_matches('/')) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };
    serve_file(&state.config.public_dir, &relative).await
}

async fn serve_file(public_dir: &Path, relative: &Path) -> Response {
    let path = public_dir.join(relative);
    match tokio::fs::read(&path).await {
        Ok(body) => {
            let mut response = Response::new(body.into());
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(relative)),
            );
            response
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Reject request paths that could escape the public directory.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

/// Content type by extension. `.plist` descriptors must always go out as
/// XML or the installing client refuses them.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("plist") => "application/xml",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
