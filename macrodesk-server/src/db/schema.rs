//! Schema bootstrap for the macros table
//!
//! Create-if-missing only; there is no migration history.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;

use crate::models::ValidationError;

/// Schema used when none is configured
pub const DEFAULT_SCHEMA: &str = "public";

/// Table holding macro records
pub const MACROS_TABLE: &str = "macros";

/// Plain SQL identifier, at most 63 bytes (the PostgreSQL limit)
static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("invalid identifier regex")
});

/// Validated schema/namespace name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName(String);

impl SchemaName {
    /// Create a schema name, rejecting anything that is not a plain identifier.
    ///
    /// # Example
    /// ```
    /// use macrodesk_server::db::SchemaName;
    ///
    /// assert!(SchemaName::new("inventory").is_ok());
    /// assert!(SchemaName::new("drop table;").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required { field: "schema" });
        }

        if !IDENT_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "schema",
                reason: "must be letters, digits and underscores, not starting with a digit, max 63 characters",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SCHEMA
    }

    /// Quoted, schema-qualified table reference for use in SQL text.
    pub fn qualify(&self, table: &str) -> String {
        format!("\"{}\".\"{}\"", self.0, table)
    }
}

impl Default for SchemaName {
    fn default() -> Self {
        Self(DEFAULT_SCHEMA.to_owned())
    }
}

/// Ensure the schema, table and index exist.
pub async fn ensure_schema(pool: &PgPool, schema: &SchemaName) -> Result<(), sqlx::Error> {
    tracing::info!(schema = %schema.as_str(), "Ensuring macros table exists...");

    if !schema.is_default() {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema.as_str()))
            .execute(pool)
            .await?;
    }

    let table = schema.qualify(MACROS_TABLE);
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id VARCHAR(36) PRIMARY KEY,
            item TEXT NOT NULL,
            model TEXT NOT NULL,
            description TEXT NOT NULL,
            vendor TEXT NOT NULL,
            multiplier NUMERIC(12, 4),
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_macros_created_at ON {table}(created_at)"
    ))
    .execute(pool)
    .await?;

    tracing::info!("Schema bootstrap complete");
    Ok(())
}
