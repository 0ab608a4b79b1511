//! Regional news site serving layer.
//!
//! Maps request paths to page descriptors, decides how each page is
//! rendered and cached, and serves the result over HTTP.

// Core subsystems
pub mod config;
pub mod context;
pub mod http;
pub mod policy;
pub mod render;
pub mod routing;

// Tooling
pub mod normalize;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::SiteConfig;
pub use context::SiteContext;
pub use http::SiteServer;
pub use lifecycle::Shutdown;
pub use policy::{resolve_policy, RenderingPolicy};
pub use routing::{RouteError, RouteTable};
