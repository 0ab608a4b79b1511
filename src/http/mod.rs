//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign request ID)
//!     → health / admin routes, or:
//!     → page handler: SiteContext::render_page (lookup → policy → cache)
//!         → response.rs (HTML + Cache-Control, x-render-mode, x-cache)
//!         → NotFound: static_files.rs (ServeDir, SPA/404 fallback)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use request::{request_id, MakeSiteRequestId, X_REQUEST_ID};
pub use server::{AppState, SiteServer};
