//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! site.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!
//! routes.yaml (path from SiteConfig.routes_path)
//!     → loader.rs (parse into RouteSource)
//!     → routing::RouteTable::from_source (patterns, policies, overlaps)
//!
//! On route source change (optional):
//!     watcher.rs detects change
//!     → loader.rs loads new RouteSource
//!     → new RouteTable built and validated
//!     → sent to the server, which swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_route_source, ConfigError};
pub use schema::{
    AdminConfig, HealthConfig, ListenerConfig, ObservabilityConfig, RouteDefinition, RouteSource,
    SiteConfig, StaticFilesConfig,
};
pub use validation::ValidationError;
