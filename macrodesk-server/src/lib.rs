//! macrodesk-server: HTTP CRUD service for macro records
//!
//! Five JSON routes over a single PostgreSQL table:
//! `GET /health`, `GET /macros`, `POST /macros`, `PUT /macros/{id}`,
//! `DELETE /macros/{id}`.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;

pub use config::{ConfigError, CorsOrigins, DatabaseConfig};
pub use error::{ServerError, ServerResult};
pub use http::{AppState, ServerConfig};

use db::{create_pool, ensure_schema, PgMacroStore};

/// Connect, bootstrap the schema, and serve until shutdown.
///
/// The pool lives for the whole call and is closed after the server drains.
pub async fn serve(server: ServerConfig, database: DatabaseConfig) -> ServerResult<()> {
    let pool = create_pool(&database).await?;
    ensure_schema(&pool, &database.schema).await?;

    let store = PgMacroStore::new(pool.clone(), &database.schema);
    let result = http::run_server(AppState::new(store), server).await;

    tracing::info!("Closing database pool");
    pool.close().await;

    result
}
