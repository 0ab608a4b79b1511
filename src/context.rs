//! Site context.
//!
//! Everything a request handler needs, constructed once at startup and
//! injected as axum state. Nothing here is process-global.
//!
//! # Design Decisions
//! - The route table is replaced whole (arc-swap), never edited in place
//! - Requests in flight keep the table they started with
//! - Replacing the table purges the render cache

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::observability::metrics;
use crate::policy::RenderingPolicy;
use crate::render::{CacheStatus, PageRenderer, RenderCache, RenderError, RenderRequest, ShellRenderer};
use crate::routing::{split_path, RouteError, RouteTable};

/// A page ready to be sent.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: Arc<str>,
    pub policy: RenderingPolicy,
    pub cache: CacheStatus,
    /// Pattern of the matched entry, used as a low-cardinality label.
    pub pattern: String,
}

/// Failure to produce a page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PageError::Route(e) if e.is_not_found())
    }
}

/// Shared, read-mostly state of the running site.
pub struct SiteContext {
    config: SiteConfig,
    routes: ArcSwap<RouteTable>,
    renderer: Arc<dyn PageRenderer>,
    cache: RenderCache,
    started_at: Instant,
}

impl SiteContext {
    pub fn new(config: SiteConfig, routes: RouteTable, renderer: Arc<dyn PageRenderer>) -> Self {
        metrics::record_route_table(routes.len());
        let cache = RenderCache::new(config.render_cache.max_entries);
        Self {
            config,
            routes: ArcSwap::from_pointee(routes),
            renderer,
            cache,
            started_at: Instant::now(),
        }
    }

    /// Context using the built-in HTML shell renderer.
    pub fn with_shell_renderer(config: SiteConfig, routes: RouteTable) -> Self {
        let renderer = Arc::new(ShellRenderer::new(&config.site));
        Self::new(config, routes, renderer)
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Snapshot of the active route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.routes.load_full()
    }

    /// Swap in a new table. Returns the number of purged cache entries.
    pub fn replace_routes(&self, table: RouteTable) -> usize {
        let entries = table.len();
        self.routes.store(Arc::new(table));
        let purged = self.cache.purge();
        metrics::record_route_table(entries);
        tracing::info!(routes = entries, purged, "Route table replaced");
        purged
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Look up `path`, resolve its policy and render it through the cache.
    pub fn render_page(&self, path: &str) -> Result<RenderedPage, PageError> {
        // Read before the table so a concurrent swap always bumps past it.
        let generation = self.cache.generation();
        let table = self.routes.load();
        let matched = table.lookup(path)?;
        let entry = matched.entry;
        let key = format!("/{}", split_path(path).join("/"));

        let (html, cache) = self.cache.get_or_render_for(&key, entry.policy, generation, || {
            self.renderer.render(&RenderRequest {
                path,
                entry,
                params: &matched.params,
            })
        })?;

        tracing::debug!(
            path = %path,
            pattern = %entry.pattern,
            policy = %entry.policy,
            cache = cache.as_str(),
            "Page rendered"
        );

        Ok(RenderedPage {
            html,
            policy: entry.policy,
            cache,
            pattern: entry.pattern.to_string(),
        })
    }
}

impl std::fmt::Debug for SiteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteContext")
            .field("routes", &self.routes.load().len())
            .field("renderer", &self.renderer)
            .field("cache", &self.cache.stats())
            .finish()
    }
}
