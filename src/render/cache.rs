//! Rendered page cache.
//!
//! # Responsibilities
//! - Store rendered HTML per concrete path for cacheable policies
//! - Decide hit / miss / revalidate / bypass from the entry's policy
//! - Fall back to the stale copy when revalidation fails
//!
//! # Design Decisions
//! - DashMap: concurrent readers never contend on a global lock
//! - Revalidation happens on the request that finds the copy expired
//! - Bounded: when full, pages are rendered but not stored
//! - Purged wholesale when the route table is replaced
//! - Pages carry the table generation they were rendered under; a render
//!   that straddles a purge is never served afterwards

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use crate::policy::RenderingPolicy;
use crate::render::renderer::RenderError;

/// How a response was produced, reported in the `x-cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Rendered because no usable copy existed.
    Miss,
    /// Copy had expired and was rendered again.
    Revalidated,
    /// Copy had expired, re-render failed, old copy served.
    Stale,
    /// Dynamic page; cache not consulted.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Revalidated => "REVALIDATED",
            CacheStatus::Stale => "STALE",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

#[derive(Debug, Clone)]
struct CachedPage {
    html: Arc<str>,
    policy: RenderingPolicy,
    generation: u64,
    rendered_at: Instant,
}

impl CachedPage {
    fn is_current(&self, policy: &RenderingPolicy, generation: u64) -> bool {
        self.policy == *policy && self.generation == generation
    }

    fn is_fresh(&self, policy: &RenderingPolicy, generation: u64, now: Instant) -> bool {
        if !self.is_current(policy, generation) {
            return false;
        }
        match policy.revalidate_after() {
            Some(interval) => now.saturating_duration_since(self.rendered_at) < interval,
            None => true,
        }
    }
}

/// Counters exposed by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
}

/// Policy-aware store of rendered pages.
#[derive(Debug)]
pub struct RenderCache {
    pages: DashMap<String, CachedPage>,
    max_entries: usize,
    generation: AtomicU64,
}

impl RenderCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            pages: DashMap::new(),
            max_entries,
            generation: AtomicU64::new(0),
        }
    }

    /// Current table generation; bumped by every [`purge`](Self::purge).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Return the page for `key` under the current generation.
    pub fn get_or_render<F>(
        &self,
        key: &str,
        policy: RenderingPolicy,
        render: F,
    ) -> Result<(Arc<str>, CacheStatus), RenderError>
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        self.get_or_render_for(key, policy, self.generation(), render)
    }

    /// Return the page for `key` as seen by a request that read `generation`
    /// before loading its route table.
    pub fn get_or_render_for<F>(
        &self,
        key: &str,
        policy: RenderingPolicy,
        generation: u64,
        render: F,
    ) -> Result<(Arc<str>, CacheStatus), RenderError>
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        self.get_or_render_at(key, policy, generation, Instant::now(), render)
    }

    pub(crate) fn get_or_render_at<F>(
        &self,
        key: &str,
        policy: RenderingPolicy,
        generation: u64,
        now: Instant,
        render: F,
    ) -> Result<(Arc<str>, CacheStatus), RenderError>
    where
        F: FnOnce() -> Result<String, RenderError>,
    {
        if !policy.is_cacheable() {
            return Ok((Arc::from(render()?), CacheStatus::Bypass));
        }

        // Clone out so no shard lock is held while rendering.
        let existing = self.pages.get(key).map(|page| page.value().clone());
        let status = match &existing {
            Some(page) if page.is_fresh(&policy, generation, now) => {
                return Ok((page.html.clone(), CacheStatus::Hit));
            }
            Some(page) if page.is_current(&policy, generation) => CacheStatus::Revalidated,
            _ => CacheStatus::Miss,
        };

        match render() {
            Ok(html) => {
                let html: Arc<str> = Arc::from(html);
                self.store(key, &html, policy, generation, now);
                Ok((html, status))
            }
            Err(e) if status == CacheStatus::Revalidated => {
                tracing::warn!(key = %key, error = %e, "Revalidation failed, serving stale page");
                match existing {
                    Some(page) => Ok((page.html, CacheStatus::Stale)),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn store(
        &self,
        key: &str,
        html: &Arc<str>,
        policy: RenderingPolicy,
        generation: u64,
        now: Instant,
    ) {
        if generation != self.generation() {
            tracing::debug!(key = %key, "Route table replaced during render, not storing");
            return;
        }
        if !self.pages.contains_key(key) && self.pages.len() >= self.max_entries {
            tracing::debug!(key = %key, max_entries = self.max_entries, "Render cache full, not storing");
            return;
        }
        self.pages.insert(
            key.to_string(),
            CachedPage {
                html: html.clone(),
                policy,
                generation,
                rendered_at: now,
            },
        );
    }

    /// Drop every stored page and start a new generation. Returns how many
    /// were removed.
    pub fn purge(&self) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let removed = self.pages.len();
        self.pages.clear();
        removed
    }

    /// Age of the stored copy for `key`, if any.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.pages.get(key).map(|page| page.rendered_at.elapsed())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.pages.len(),
            max_entries: self.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> impl FnOnce() -> Result<String, RenderError> + '_ {
        move || Ok(body.to_string())
    }

    fn failing() -> Result<String, RenderError> {
        Err(RenderError::Component {
            component: "Page".into(),
            reason: "data layer unavailable".into(),
        })
    }

    #[test]
    fn test_dynamic_always_renders() {
        let cache = RenderCache::new(10);
        let (html, status) = cache.get_or_render("/live", RenderingPolicy::Dynamic, ok("a")).unwrap();
        assert_eq!((&*html, status), ("a", CacheStatus::Bypass));
        let (html, status) = cache.get_or_render("/live", RenderingPolicy::Dynamic, ok("b")).unwrap();
        assert_eq!((&*html, status), ("b", CacheStatus::Bypass));
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_static_renders_once() {
        let cache = RenderCache::new(10);
        let (_, status) = cache.get_or_render("/about", RenderingPolicy::Static, ok("v1")).unwrap();
        assert_eq!(status, CacheStatus::Miss);

        let far_future = Instant::now() + Duration::from_secs(10 * 365 * 24 * 3600);
        let (html, status) = cache
            .get_or_render_at("/about", RenderingPolicy::Static, 0, far_future, ok("v2"))
            .unwrap();
        assert_eq!((&*html, status), ("v1", CacheStatus::Hit));
    }

    #[test]
    fn test_incremental_revalidates_after_interval() {
        let cache = RenderCache::new(10);
        let policy = RenderingPolicy::incremental(60).unwrap();
        let start = Instant::now();

        let (_, status) = cache.get_or_render_at("/events", policy, 0, start, ok("v1")).unwrap();
        assert_eq!(status, CacheStatus::Miss);

        let (html, status) = cache
            .get_or_render_at("/events", policy, 0, start + Duration::from_secs(59), ok("v2"))
            .unwrap();
        assert_eq!((&*html, status), ("v1", CacheStatus::Hit));

        let (html, status) = cache
            .get_or_render_at("/events", policy, 0, start + Duration::from_secs(60), ok("v2"))
            .unwrap();
        assert_eq!((&*html, status), ("v2", CacheStatus::Revalidated));

        let (html, status) = cache
            .get_or_render_at("/events", policy, 0, start + Duration::from_secs(61), ok("v3"))
            .unwrap();
        assert_eq!((&*html, status), ("v2", CacheStatus::Hit));
    }

    #[test]
    fn test_failed_revalidation_serves_stale() {
        let cache = RenderCache::new(10);
        let policy = RenderingPolicy::incremental(1).unwrap();
        let start = Instant::now();
        cache.get_or_render_at("/photos", policy, 0, start, ok("v1")).unwrap();

        let (html, status) = cache
            .get_or_render_at("/photos", policy, 0, start + Duration::from_secs(5), failing)
            .unwrap();
        assert_eq!((&*html, status), ("v1", CacheStatus::Stale));
    }

    #[test]
    fn test_miss_failure_propagates() {
        let cache = RenderCache::new(10);
        assert!(cache.get_or_render("/x", RenderingPolicy::Static, failing).is_err());
    }

    #[test]
    fn test_policy_change_is_a_miss() {
        let cache = RenderCache::new(10);
        cache.get_or_render("/news", RenderingPolicy::Static, ok("old")).unwrap();
        let policy = RenderingPolicy::incremental(300).unwrap();
        let (html, status) = cache.get_or_render("/news", policy, ok("new")).unwrap();
        assert_eq!((&*html, status), ("new", CacheStatus::Miss));
    }

    #[test]
    fn test_capacity_bound() {
        let cache = RenderCache::new(1);
        cache.get_or_render("/a", RenderingPolicy::Static, ok("a")).unwrap();
        let (_, status) = cache.get_or_render("/b", RenderingPolicy::Static, ok("b")).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (_, status) = cache.get_or_render("/b", RenderingPolicy::Static, ok("b")).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.age("/a").is_some());
    }

    #[test]
    fn test_render_straddling_purge_is_not_served() {
        let cache = RenderCache::new(10);
        let before = cache.generation();

        // Table swapped while an old-table render was in flight.
        cache.purge();
        let (html, status) = cache
            .get_or_render_for("/about", RenderingPolicy::Static, before, ok("old title"))
            .unwrap();
        assert_eq!((&*html, status), ("old title", CacheStatus::Miss));
        assert_eq!(cache.stats().entries, 0);

        let (html, status) = cache
            .get_or_render("/about", RenderingPolicy::Static, ok("new title"))
            .unwrap();
        assert_eq!((&*html, status), ("new title", CacheStatus::Miss));
        let (html, status) = cache
            .get_or_render("/about", RenderingPolicy::Static, ok("unused"))
            .unwrap();
        assert_eq!((&*html, status), ("new title", CacheStatus::Hit));
    }

    #[test]
    fn test_stale_generation_entry_is_a_miss() {
        let cache = RenderCache::new(10);
        let policy = RenderingPolicy::incremental(60).unwrap();
        let start = Instant::now();
        cache.get_or_render_at("/events", policy, 0, start, ok("v1")).unwrap();

        // Fresh by age, but rendered under an older table.
        cache.generation.store(1, Ordering::SeqCst);
        let (html, status) = cache
            .get_or_render_at("/events", policy, 1, start, ok("v2"))
            .unwrap();
        assert_eq!((&*html, status), ("v2", CacheStatus::Miss));
    }

    #[test]
    fn test_purge() {
        let cache = RenderCache::new(10);
        cache.get_or_render("/a", RenderingPolicy::Static, ok("a")).unwrap();
        cache.get_or_render("/b", RenderingPolicy::Static, ok("b")).unwrap();
        assert_eq!(cache.purge(), 2);
        assert_eq!(cache.stats().entries, 0);
    }
}
