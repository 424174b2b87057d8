//! HTTP server command
//!
//! Every flag falls back to an environment variable so the service can be
//! configured entirely from the host environment or a `.env` file.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;

use macrodesk_server::config::{DEFAULT_MAX_OVERFLOW, DEFAULT_POOL_SIZE};
use macrodesk_server::http::server::DEFAULT_PORT;
use macrodesk_server::{CorsOrigins, DatabaseConfig, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// PostgreSQL connection string (postgres:// or postgresql://)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Schema that holds the macros table (created if missing)
    #[arg(long, env = "DB_SCHEMA", default_value = "public")]
    pub schema: String,

    /// Allowed CORS origin(s), comma-separated; unset allows any origin
    #[arg(long, env = "FRONTEND_ORIGIN")]
    pub frontend_origin: Option<String>,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Connections kept open in the pool
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    /// Extra connections allowed above the pool size
    #[arg(long, env = "DB_MAX_OVERFLOW", default_value_t = DEFAULT_MAX_OVERFLOW)]
    pub max_overflow: u32,
}

impl ServeArgs {
    fn into_configs(self) -> Result<(ServerConfig, DatabaseConfig)> {
        let database = DatabaseConfig::new(&self.database_url, &self.schema)
            .context("Invalid database configuration")?
            .with_pool(self.pool_size, self.max_overflow);

        let cors = CorsOrigins::parse(self.frontend_origin.as_deref())
            .context("Invalid FRONTEND_ORIGIN")?;

        let server = ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors,
        };

        Ok((server, database))
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let (server, database) = args.into_configs()?;

    tracing::info!(
        bind = %server.bind_addr,
        schema = %database.schema.as_str(),
        "Starting macrodesk server"
    );

    // Blocks until shutdown
    macrodesk_server::serve(server, database)
        .await
        .context("Server error")?;

    Ok(())
}
