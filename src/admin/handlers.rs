use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::policy::cache_control::cache_control;
use crate::policy::RenderingPolicy;
use crate::render::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub site: String,
    pub routes: usize,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct RouteSummary {
    pub pattern: String,
    pub title: String,
    pub component: String,
    pub policy: RenderingPolicy,
    pub cache_control: String,
}

#[derive(Serialize)]
pub struct PurgeResult {
    pub purged: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        site: state.ctx.config().site.name.clone(),
        routes: state.ctx.routes().len(),
        uptime_secs: state.ctx.uptime().as_secs(),
    })
}

/// Route table in declaration order.
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    let table = state.ctx.routes();
    let routes = table
        .entries()
        .iter()
        .map(|entry| RouteSummary {
            pattern: entry.pattern.to_string(),
            title: entry.descriptor.title.clone(),
            component: entry.descriptor.component.to_string(),
            policy: entry.policy,
            cache_control: cache_control(&entry.policy),
        })
        .collect();
    Json(routes)
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.ctx.cache().stats())
}

pub async fn purge_cache(State(state): State<AppState>) -> Json<PurgeResult> {
    let purged = state.ctx.cache().purge();
    tracing::info!(purged, "Render cache purged via admin API");
    Json(PurgeResult { purged })
}
