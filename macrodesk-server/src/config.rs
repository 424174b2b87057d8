//! Database and CORS configuration
//!
//! Values arrive already parsed from the command line / environment; this
//! module only normalizes and validates them.

use axum::http::HeaderValue;

use crate::db::SchemaName;
use crate::models::ValidationError;

/// Warm connections kept in the pool
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Extra connections allowed above the pool size under load
pub const DEFAULT_MAX_OVERFLOW: u32 = 10;

/// Configuration error, fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is required")]
    MissingDatabaseUrl,

    #[error("unsupported database URL scheme '{0}' (expected postgres:// or postgresql://)")]
    UnsupportedScheme(String),

    #[error("invalid schema name: {0}")]
    Schema(#[from] ValidationError),

    #[error("invalid CORS origin '{0}'")]
    Origin(String),
}

/// Rewrite the accepted PostgreSQL URL spellings to the `postgres://` scheme.
///
/// Hosting providers hand out `postgres://`, ORMs in other stacks often use
/// `postgresql://` or `postgresql+<driver>://`.
pub fn normalize_database_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::MissingDatabaseUrl);
    }

    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| ConfigError::UnsupportedScheme(url.to_owned()))?;

    let base = scheme.split('+').next().unwrap_or(scheme);
    match base.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(format!("postgres://{}", rest)),
        _ => Err(ConfigError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Normalized `postgres://` URL
    pub url: String,
    pub schema: SchemaName,
    pub pool_size: u32,
    pub max_overflow: u32,
}

impl DatabaseConfig {
    /// Build from raw values, normalizing the URL and validating the schema.
    pub fn new(url: &str, schema: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: normalize_database_url(url)?,
            schema: SchemaName::new(schema)?,
            pool_size: DEFAULT_POOL_SIZE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
        })
    }

    pub fn with_pool(mut self, pool_size: u32, max_overflow: u32) -> Self {
        self.pool_size = pool_size;
        self.max_overflow = max_overflow;
        self
    }

    /// Upper bound on open connections
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow).max(1)
    }
}

/// Which origins may make cross-origin requests
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CorsOrigins {
    /// No restriction
    #[default]
    Any,
    /// Only these origins
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list. `None`, blank and `*` mean any origin.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match raw.map(str::trim) {
            None | Some("") | Some("*") => return Ok(Self::Any),
            Some(raw) => raw,
        };

        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                o.trim_end_matches('/')
                    .parse::<HeaderValue>()
                    .map_err(|_| ConfigError::Origin(o.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            return Ok(Self::Any);
        }
        Ok(Self::List(origins))
    }
}
