//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteSource (YAML)
//!     → matcher.rs (parse patterns, validate parameter names)
//!     → policy resolver (one RenderingPolicy per entry)
//!     → router.rs (reject duplicates and overlaps)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (path)
//!     → router.rs (scan entries, most literal segments wins)
//!     → Return: RouteMatch { entry, params } or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - Overlaps are configuration defects caught before serving

pub mod matcher;
pub mod router;

pub use matcher::{split_path, PatternError, RoutePattern, Segment};
pub use router::{ComponentRef, PageDescriptor, RouteEntry, RouteError, RouteMatch, RouteTable};
