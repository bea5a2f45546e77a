//! HTTP API layer for quill.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: posts, comments, likes, favorites, notifications, auth
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: request logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
