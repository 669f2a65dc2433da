//! Development content server
//!
//! Serves a local content tree over HTTP the way a static host would:
//! files as-is, and a generated index page for each directory. The index
//! pages use plain relative links, which is the format `HttpSource` reads
//! collection listings from.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use walkdir::WalkDir;

use crate::helpers::{encode_href, escape_html};
use crate::Cms;

/// Server state
struct ServerState {
    content_dir: PathBuf,
}

/// Build the router serving `content_dir`
pub fn router(content_dir: PathBuf) -> Router {
    let state = Arc::new(ServerState { content_dir });

    Router::new()
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the development content server
pub async fn start(cms: &Cms, ip: &str, port: u16) -> Result<()> {
    if !cms.content_dir.is_dir() {
        anyhow::bail!("Content directory {:?} does not exist", cms.content_dir);
    }

    let app = router(cms.content_dir.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Serving {:?} at http://{}:{}/", cms.content_dir, ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve directory indexes ourselves, everything else through `ServeDir`
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let uri_path = request.uri().path().to_string();
    let decoded = percent_decode_str(&uri_path).decode_utf8_lossy();

    let Some(relative) = safe_relative(&decoded) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };
    let candidate = state.content_dir.join(&relative);

    if candidate.is_dir() {
        if !uri_path.ends_with('/') {
            // Relative links on the index page need the trailing slash
            return Redirect::permanent(&format!("{}/", uri_path)).into_response();
        }
        let title = format!("/{}", relative.to_string_lossy());
        return Html(render_index(&title, &candidate)).into_response();
    }

    let mut service = ServeDir::new(&state.content_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", uri_path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Request path as a path under the content root, or None if it escapes
fn safe_relative(path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| relative.to_path_buf())
}

/// Index page listing the entries of `dir`, sub-directories with a trailing slash
fn render_index(title: &str, dir: &Path) -> String {
    let items: String = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let suffix = if e.file_type().is_dir() { "/" } else { "" };
            Some(format!(
                "<li><a href=\"{}{}\">{}{}</a></li>\n",
                encode_href(&name),
                suffix,
                escape_html(&name),
                suffix
            ))
        })
        .collect();

    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n<body>\n<h1>Index of {title}</h1>\n<ul>\n{items}</ul>\n</body>\n</html>\n"
    )
}
