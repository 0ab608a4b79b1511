//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, security headers)
//! - Bind server to listener
//! - Dispatch page requests to the site context
//! - Fall back to static files for unknown paths
//! - Apply route table updates from the watcher
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::context::SiteContext;
use crate::http::request::{request_id, MakeSiteRequestId};
use crate::http::response::{internal_error, method_not_allowed, page_response};
use crate::http::static_files::serve_static;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::headers::{
    content_type_options_layer, frame_options_layer, referrer_policy_layer,
};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub ctx: Arc<SiteContext>,
}

/// HTTP server for the site.
pub struct SiteServer {
    router: Router,
    ctx: Arc<SiteContext>,
}

impl SiteServer {
    /// Create a new server around an initialized site context.
    pub fn new(ctx: Arc<SiteContext>) -> Self {
        let state = AppState { ctx: ctx.clone() };
        let router = Self::build_router(state);
        Self { router, ctx }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let ctx = state.ctx.clone();
        let config = ctx.config();

        let mut router = Router::new().route(&config.health.path, get(health_handler));
        if config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        }

        let mut router = router
            .fallback(page_handler)
            .with_state(state);

        if config.security.enable_headers {
            router = router
                .layer(content_type_options_layer())
                .layer(frame_options_layer())
                .layer(referrer_policy_layer());
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeSiteRequestId))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// Tables received on `updates` replace the active route table.
    pub async fn run(
        self,
        listener: TcpListener,
        mut updates: mpsc::UnboundedReceiver<RouteTable>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.ctx.routes().len(),
            "HTTP server starting"
        );

        let ctx = self.ctx.clone();
        let reload = tokio::spawn(async move {
            while let Some(table) = updates.recv().await {
                ctx.replace_routes(table);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    routes: usize,
    uptime_secs: u64,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        routes: state.ctx.routes().len(),
        uptime_secs: state.ctx.uptime().as_secs(),
    })
}

/// Main page handler.
/// Looks up the route, renders through the cache, or falls back to static files.
async fn page_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();
    let path = request.uri().path().to_string();
    let id = request_id(request.headers()).to_string();

    tracing::debug!(request_id = %id, method = %method, path = %path, "Serving request");

    if method != Method::GET && method != Method::HEAD {
        let pattern = state
            .ctx
            .routes()
            .lookup(&path)
            .ok()
            .map(|matched| matched.entry.pattern.to_string());
        if let Some(pattern) = pattern {
            metrics::record_request(&method_str, 405, &pattern, start_time);
            return method_not_allowed();
        }
        let response = serve_static(&state.ctx.config().static_files, request).await;
        metrics::record_request(&method_str, response.status().as_u16(), "static", start_time);
        return response;
    }

    match state.ctx.render_page(&path) {
        Ok(page) => {
            metrics::record_render(&page.policy, page.cache);
            metrics::record_request(&method_str, 200, &page.pattern, start_time);
            page_response(&page)
        }
        Err(e) if e.is_not_found() => {
            let response = serve_static(&state.ctx.config().static_files, request).await;
            let status = response.status();
            let route = if status == StatusCode::NOT_FOUND { "none" } else { "static" };
            if status == StatusCode::NOT_FOUND {
                tracing::debug!(request_id = %id, path = %path, "No page or file matched");
            }
            metrics::record_request(&method_str, status.as_u16(), route, start_time);
            response
        }
        Err(e) => {
            tracing::error!(request_id = %id, path = %path, error = %e, "Page request failed");
            metrics::record_request(&method_str, 500, "error", start_time);
            internal_error()
        }
    }
}
