//! HTTP API server for the Vitrine signed-access gateway.
//!
//! This crate provides the request surface:
//! - Capability-token verification for signed links
//! - Allow-list checks for simple links
//! - HLS playlist rewriting with per-segment presigned URLs
//! - Redirects to presigned URLs for opaque binary objects

pub mod error;
pub mod handlers;
pub mod rewrite;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
