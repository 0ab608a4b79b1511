//! Response construction.
//!
//! # Responsibilities
//! - Turn a rendered page into an HTML response
//! - Attach Cache-Control derived from the page's rendering policy
//! - Report render mode and cache outcome in response headers
//!
//! # Design Decisions
//! - Error bodies are plain text; pages never leak internal errors

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::context::RenderedPage;
use crate::policy::cache_control::cache_control_header;

/// Rendering mode of the page (`static`, `incremental`, `dynamic`).
pub const X_RENDER_MODE: &str = "x-render-mode";

/// Cache outcome (`HIT`, `MISS`, `REVALIDATED`, `STALE`, `BYPASS`).
pub const X_CACHE: &str = "x-cache";

/// HTML response for a rendered page.
pub fn page_response(page: &RenderedPage) -> Response {
    let mut response = Response::new(Body::from(page.html.to_string()));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, cache_control_header(&page.policy));
    headers.insert(X_RENDER_MODE, HeaderValue::from_static(page.policy.label()));
    headers.insert(X_CACHE, HeaderValue::from_static(page.cache.as_str()));
    response
}

/// 405 for non-GET requests to a page.
pub fn method_not_allowed() -> Response {
    let allow = format!("{}, {}", Method::GET, Method::HEAD);
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// 500 with a generic body.
pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
