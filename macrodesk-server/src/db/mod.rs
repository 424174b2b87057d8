//! Database layer - connection pool, schema bootstrap and repositories
//!
//! # Design Principles
//!
//! - One bounded pool per process, built at startup and closed on shutdown
//! - One statement per request; not-found comes from RETURNING, no
//!   check-then-write
//! - Schema and table are created if missing, nothing more

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::create_pool;
pub use repos::*;
pub use schema::{ensure_schema, SchemaName};
