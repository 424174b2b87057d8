//! Axum server setup
//!
//! Server skeleton with:
//! - CORS restricted to configured origins (any origin when unset)
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::CorsOrigins;
use crate::db::MacroStore;
use crate::error::ServerError;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8787;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8787)
    pub bind_addr: SocketAddr,

    /// Origins allowed to make cross-origin requests
    pub cors: CorsOrigins,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            cors: CorsOrigins::Any,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Box<dyn MacroStore>,
}

impl AppState {
    pub fn new(store: impl MacroStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        CorsOrigins::Any => {
            tracing::info!("CORS: all origins allowed");
            layer.allow_origin(Any)
        }
        CorsOrigins::List(list) => {
            tracing::info!(origins = ?list, "CORS: restricted origins");
            layer.allow_origin(list.clone())
        }
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState, cors: &CorsOrigins) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::macros::router())
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let store = PgMacroStore::new(pool, &schema);
/// run_server(AppState::new(store), ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config.cors);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
