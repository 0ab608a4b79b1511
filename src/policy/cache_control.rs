//! `Cache-Control` values for each rendering policy.
//!
//! Shared caches (CDN) follow `s-maxage`; browsers never keep dynamic pages.

use axum::http::HeaderValue;

use super::RenderingPolicy;

/// One year, the lifetime advertised for static pages.
const STATIC_MAX_AGE_SECS: u64 = 31_536_000;

const DYNAMIC_CACHE_CONTROL: &str = "private, no-cache, no-store, max-age=0, must-revalidate";

/// Cache-Control header text for a policy.
pub fn cache_control(policy: &RenderingPolicy) -> String {
    match policy {
        RenderingPolicy::Static => {
            format!("s-maxage={}, stale-while-revalidate", STATIC_MAX_AGE_SECS)
        }
        RenderingPolicy::Incremental(secs) => format!("s-maxage={}, stale-while-revalidate", secs),
        RenderingPolicy::Dynamic => DYNAMIC_CACHE_CONTROL.to_string(),
    }
}

/// Same as [`cache_control`], as a header value.
pub fn cache_control_header(policy: &RenderingPolicy) -> HeaderValue {
    match policy {
        RenderingPolicy::Dynamic => HeaderValue::from_static(DYNAMIC_CACHE_CONTROL),
        // Digits, commas and ASCII words only.
        other => HeaderValue::from_str(&cache_control(other))
            .unwrap_or_else(|_| HeaderValue::from_static(DYNAMIC_CACHE_CONTROL)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_is_cached_for_a_year() {
        assert_eq!(
            cache_control(&RenderingPolicy::Static),
            "s-maxage=31536000, stale-while-revalidate"
        );
    }

    #[test]
    fn test_incremental_uses_interval() {
        let policy = RenderingPolicy::incremental(3600).unwrap();
        assert_eq!(cache_control(&policy), "s-maxage=3600, stale-while-revalidate");
        assert_eq!(
            cache_control_header(&policy),
            HeaderValue::from_static("s-maxage=3600, stale-while-revalidate")
        );
    }

    #[test]
    fn test_dynamic_is_never_stored() {
        let value = cache_control_header(&RenderingPolicy::Dynamic);
        assert!(value.to_str().unwrap().contains("no-store"));
    }
}
