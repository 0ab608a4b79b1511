//! Page rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RouteMatch + RenderingPolicy
//!     → cache.rs (hit? expired? dynamic?)
//!     → renderer.rs (PageRenderer, only when a fresh render is needed)
//!     → HTML + CacheStatus
//! ```

pub mod cache;
pub mod renderer;

pub use cache::{CacheStats, CacheStatus, RenderCache};
pub use renderer::{escape_html, PageRenderer, RenderError, RenderRequest, ShellRenderer};
