//! Static file serving.
//!
//! Requests that match no page fall through to the files under
//! `static_files.dir`. With `spa_fallback` set, unknown paths get
//! `index.html` so the client router can take over; otherwise a `404.html`
//! in the same directory is used as the not-found page when present.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;

/// Name of the custom not-found page inside the static directory.
const NOT_FOUND_PAGE: &str = "404.html";

/// Serve `request` from the static directory.
pub async fn serve_static(config: &StaticFilesConfig, request: Request<Body>) -> Response {
    let dir = Path::new(&config.dir);

    let result = if config.spa_fallback {
        ServeDir::new(dir)
            .fallback(ServeFile::new(dir.join("index.html")))
            .oneshot(request)
            .await
            .map(|response| response.map(Body::new))
    } else {
        ServeDir::new(dir)
            .oneshot(request)
            .await
            .map(|response| response.map(Body::new))
    };

    let response = match result {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        return not_found(dir).await;
    }
    response
}

async fn not_found(dir: &Path) -> Response {
    match tokio::fs::read(dir.join(NOT_FOUND_PAGE)).await {
        Ok(page) => {
            let mut response = (StatusCode::NOT_FOUND, page).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            response
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    fn config(dir: &Path, spa_fallback: bool) -> StaticFilesConfig {
        StaticFilesConfig {
            dir: dir.to_string_lossy().into_owned(),
            spa_fallback,
        }
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *\n").unwrap();

        let response = serve_static(&config(dir.path(), false), request("/robots.txt")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_uses_404_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("404.html"), "<h1>Gone</h1>").unwrap();

        let response = serve_static(&config(dir.path(), false), request("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_missing_file_without_404_page() {
        let dir = tempfile::tempdir().unwrap();
        let response = serve_static(&config(dir.path(), false), request("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_spa_fallback_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=\"app\"></div>").unwrap();

        let response = serve_static(&config(dir.path(), true), request("/some/client/route")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
