//! Rendering policy resolution.
//!
//! Route sources describe rendering intent with two loosely-typed fields
//! (`dynamic` and `revalidate`) plus a client-only marker. This module
//! collapses them into a single [`RenderingPolicy`].
//!
//! # Rules (first match wins)
//! 1. Client-only page → `Dynamic`
//! 2. `force-static` with no interval → `Static`
//! 3. Positive interval, not `force-dynamic` → `Incremental(n)`
//! 4. `force-dynamic` → `Dynamic`
//! 5. Anything else → [`PolicyConfigError::Ambiguous`]

use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared `dynamic` flag of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DynamicFlag {
    /// No preference; same as leaving the field out.
    Auto,
    /// Render at build time. `error` is the older spelling.
    #[serde(alias = "error")]
    ForceStatic,
    /// Render on every request.
    ForceDynamic,
}

/// Declared `revalidate` value of a page: seconds or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RevalidateValue {
    Seconds(i64),
    Flag(bool),
}

/// Rendering fields as written in the route source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawRenderingConfig {
    pub dynamic: Option<DynamicFlag>,
    pub revalidate: Option<RevalidateValue>,
}

impl RawRenderingConfig {
    pub fn new(dynamic: Option<DynamicFlag>, revalidate: Option<RevalidateValue>) -> Self {
        Self { dynamic, revalidate }
    }
}

/// How a page is rendered and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", content = "interval_secs", rename_all = "lowercase")]
pub enum RenderingPolicy {
    /// Rendered once, never revalidated.
    Static,
    /// Cached, re-rendered once the interval (seconds) has elapsed.
    Incremental(NonZeroU64),
    /// Rendered fresh on every request, never cached.
    Dynamic,
}

impl RenderingPolicy {
    /// Incremental policy for `secs` seconds, `None` when `secs` is zero.
    pub fn incremental(secs: u64) -> Option<Self> {
        NonZeroU64::new(secs).map(Self::Incremental)
    }

    /// Short lowercase name, used in headers, logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Incremental(_) => "incremental",
            Self::Dynamic => "dynamic",
        }
    }

    /// Revalidation interval, only for incremental pages.
    pub fn revalidate_after(&self) -> Option<Duration> {
        match self {
            Self::Incremental(secs) => Some(Duration::from_secs(secs.get())),
            _ => None,
        }
    }

    /// Whether rendered output may be stored and reused.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Dynamic)
    }
}

impl fmt::Display for RenderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental(secs) => write!(f, "incremental({}s)", secs),
            other => f.write_str(other.label()),
        }
    }
}

/// Errors produced while resolving a page's rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyConfigError {
    /// Neither flag nor interval selects a mode.
    #[error("ambiguous or missing rendering configuration")]
    Ambiguous,

    /// `revalidate` was zero or negative.
    #[error("revalidate must be a positive number of seconds, got {0}")]
    NonPositiveInterval(i64),

    /// `revalidate: true` carries no interval.
    #[error("revalidate accepts a number of seconds or false, got true")]
    InvalidRevalidateFlag,

    /// A server-only page resolved to Static without being marked immutable.
    #[error("server-only page cannot be rendered statically unless marked immutable")]
    MutableServerOnlyStatic,
}

/// Resolve the rendering policy of one page.
pub fn resolve_policy(
    raw: &RawRenderingConfig,
    uses_client_only_features: bool,
) -> Result<RenderingPolicy, PolicyConfigError> {
    if uses_client_only_features {
        return Ok(RenderingPolicy::Dynamic);
    }

    let flag = raw.dynamic.filter(|f| *f != DynamicFlag::Auto);
    let interval = match raw.revalidate {
        None | Some(RevalidateValue::Flag(false)) => None,
        Some(RevalidateValue::Flag(true)) => return Err(PolicyConfigError::InvalidRevalidateFlag),
        Some(RevalidateValue::Seconds(secs)) => Some(
            u64::try_from(secs)
                .ok()
                .and_then(NonZeroU64::new)
                .ok_or(PolicyConfigError::NonPositiveInterval(secs))?,
        ),
    };

    match (flag, interval) {
        (Some(DynamicFlag::ForceStatic), None) => Ok(RenderingPolicy::Static),
        (Some(DynamicFlag::ForceDynamic), _) => Ok(RenderingPolicy::Dynamic),
        (_, Some(secs)) => Ok(RenderingPolicy::Incremental(secs)),
        _ => Err(PolicyConfigError::Ambiguous),
    }
}

/// Reject a Static policy on a server-only page unless it is immutable.
pub fn check_server_only(
    policy: RenderingPolicy,
    server_only: bool,
    immutable: bool,
) -> Result<RenderingPolicy, PolicyConfigError> {
    if server_only && !immutable && policy == RenderingPolicy::Static {
        return Err(PolicyConfigError::MutableServerOnlyStatic);
    }
    Ok(policy)
}
