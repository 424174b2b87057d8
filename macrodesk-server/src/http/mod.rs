//! HTTP server layer
//!
//! Axum server with:
//! - Configurable CORS
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerConfig};
pub use error::ApiError;
