//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (X-Content-Type-Options, X-Frame-Options, Referrer-Policy)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Headers are set by overriding layers; handlers cannot weaken them
//! - Toggled as a whole by `security.enable_headers`

pub mod headers;
