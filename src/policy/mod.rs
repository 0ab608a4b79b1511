//! Rendering policy subsystem.
//!
//! # Data Flow
//! ```text
//! Route source entry (dynamic, revalidate, client_only)
//!     → resolver.rs (one total function, first matching rule wins)
//!     → RenderingPolicy { Static | Incremental(n) | Dynamic }
//!     → attached to the RouteEntry at table construction
//!
//! Request time:
//!     RenderingPolicy
//!     → render cache decides hit / miss / revalidate / bypass
//!     → cache_control.rs turns it into response headers
//! ```
//!
//! # Design Decisions
//! - Resolution is pure: no I/O, no clock, callable from any task
//! - Client-only pages are always Dynamic, whatever else they declare
//! - Policies are immutable once attached to an entry

pub mod cache_control;
pub mod resolver;

pub use resolver::{
    check_server_only, resolve_policy, DynamicFlag, PolicyConfigError, RawRenderingConfig,
    RenderingPolicy, RevalidateValue,
};
