//! Macro repository
//!
//! Every operation is a single statement:
//! - create: INSERT ... RETURNING
//! - update: UPDATE ... RETURNING (no row means not found)
//! - delete: DELETE ... RETURNING id (no row means not found)

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::schema::{SchemaName, MACROS_TABLE};
use crate::models::{Macro, MacroInput};

const COLUMNS: &str = "id, item, model, description, vendor, multiplier, notes, created_at";

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    fn not_found(id: &str) -> Self {
        Self::NotFound {
            resource: "macro",
            id: id.to_owned(),
        }
    }
}

/// Persistence operations the HTTP layer needs (testable)
#[async_trait]
pub trait MacroStore: Send + Sync {
    /// All macros, oldest first
    async fn list(&self) -> Result<Vec<Macro>, DbError>;

    /// Insert with a generated id and server timestamp
    async fn create(&self, input: MacroInput) -> Result<Macro, DbError>;

    /// Overwrite every mutable field of an existing macro
    async fn update(&self, id: &str, input: MacroInput) -> Result<Macro, DbError>;

    async fn delete(&self, id: &str) -> Result<(), DbError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgMacroStore {
    pool: PgPool,
    table: String,
}

impl PgMacroStore {
    pub fn new(pool: PgPool, schema: &SchemaName) -> Self {
        Self {
            pool,
            table: schema.qualify(MACROS_TABLE),
        }
    }
}

#[async_trait]
impl MacroStore for PgMacroStore {
    async fn list(&self) -> Result<Vec<Macro>, DbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY created_at ASC, id ASC",
            self.table
        );
        let rows = sqlx::query_as::<_, Macro>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn create(&self, input: MacroInput) -> Result<Macro, DbError> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, item, model, description, vendor, multiplier, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#,
            self.table
        );
        let row = sqlx::query_as::<_, Macro>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&input.item)
            .bind(&input.model)
            .bind(&input.description)
            .bind(&input.vendor)
            .bind(input.multiplier)
            .bind(&input.notes)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(id = %row.id, "macro created");
        Ok(row)
    }

    async fn update(&self, id: &str, input: MacroInput) -> Result<Macro, DbError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET item = $2, model = $3, description = $4, vendor = $5,
                multiplier = $6, notes = $7
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
            self.table
        );
        let row = sqlx::query_as::<_, Macro>(&sql)
            .bind(id)
            .bind(&input.item)
            .bind(&input.model)
            .bind(&input.description)
            .bind(&input.vendor)
            .bind(input.multiplier)
            .bind(&input.notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(id))?;

        tracing::debug!(id = %row.id, "macro updated");
        Ok(row)
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING id", self.table);
        sqlx::query_scalar::<_, String>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(id))?;

        tracing::debug!(id = %id, "macro deleted");
        Ok(())
    }
}
