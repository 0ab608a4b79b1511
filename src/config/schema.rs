//! Configuration schema definitions.
//!
//! Two documents are described here:
//! - [`SiteConfig`], the server configuration (TOML)
//! - [`RouteSource`], the route table source (YAML), which the
//!   `normalize-routes` tool rewrites in place
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::policy::{DynamicFlag, RawRenderingConfig, RevalidateValue};

/// Default location of the route source, relative to the working directory.
pub const DEFAULT_ROUTES_PATH: &str = "config/routes.yaml";

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Site identity used by the page shell.
    pub site: SiteInfoConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Path of the route source file.
    pub routes_path: RoutesPath,

    /// Static file fallback.
    pub static_files: StaticFilesConfig,

    /// Health endpoint.
    pub health: HealthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rendered page cache.
    pub render_cache: RenderCacheConfig,

    /// Route source reload.
    pub reload: ReloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    pub security: SecurityConfig,
}

/// Route source location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RoutesPath(pub String);

impl Default for RoutesPath {
    fn default() -> Self {
        Self(DEFAULT_ROUTES_PATH.to_string())
    }
}

impl AsRef<std::path::Path> for RoutesPath {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// Site identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteInfoConfig {
    /// Appended to every page title.
    pub name: String,

    /// `lang` attribute of rendered documents.
    pub lang: String,
}

impl Default for SiteInfoConfig {
    fn default() -> Self {
        Self {
            name: "Regional News".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Static file fallback served when no page matches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding built assets.
    pub dir: String,

    /// Serve `index.html` for unknown paths instead of 404.
    pub spa_fallback: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: "public".to_string(),
            spa_fallback: false,
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Path answered by the health handler.
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: "/health".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rendered page cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderCacheConfig {
    /// Maximum number of stored pages. Zero disables storage.
    pub max_entries: usize,
}

impl Default for RenderCacheConfig {
    fn default() -> Self {
        Self { max_entries: 1024 }
    }
}

/// Route source reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the route source and swap in a new table when it changes.
    pub watch_routes: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API under `/admin`.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

/// Placeholder key rejected by validation when the admin API is enabled.
pub const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add security response headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// The route table source document.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RouteSource {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
}

/// One page as declared in the route source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteDefinition {
    /// Path pattern, e.g. `/author/:authorId`.
    pub pattern: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Name of the UI component rendering this page.
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicFlag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revalidate: Option<RevalidateValue>,

    /// The page depends on browser-only state (live hooks).
    #[serde(default)]
    pub client_only: bool,

    /// The page renders server-side data at request time.
    #[serde(default)]
    pub server_only: bool,

    /// Server-only content that never changes once rendered.
    #[serde(default)]
    pub immutable: bool,
}

impl RouteDefinition {
    /// Rendering fields, as handed to the policy resolver.
    pub fn rendering(&self) -> RawRenderingConfig {
        RawRenderingConfig::new(self.dynamic, self.revalidate)
    }
}
