//! In-memory `MacroStore` for router tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DbError, MacroStore};
use crate::models::{Macro, MacroInput};

#[derive(Default)]
pub struct MemoryMacroStore {
    rows: Mutex<Vec<Macro>>,
    /// When set, every write fails with this message
    fail_with: Option<String>,
}

impl MemoryMacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes fail like a broken connection would
    pub fn failing(message: &str) -> Self {
        Self {
            rows: Mutex::default(),
            fail_with: Some(message.to_owned()),
        }
    }

    /// Seed a row with a fixed timestamp
    pub async fn insert_row(&self, id: &str, input: MacroInput, created_at: DateTime<Utc>) {
        self.rows
            .lock()
            .await
            .push(Macro::from_input(id.to_owned(), input, created_at));
    }

    fn check(&self) -> Result<(), DbError> {
        match &self.fail_with {
            Some(msg) => Err(DbError::Sqlx(sqlx::Error::Protocol(msg.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MacroStore for MemoryMacroStore {
    async fn list(&self) -> Result<Vec<Macro>, DbError> {
        self.check()?;
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create(&self, input: MacroInput) -> Result<Macro, DbError> {
        self.check()?;
        let row = Macro::from_input(Uuid::new_v4().to_string(), input, Utc::now());
        self.rows.lock().await.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: &str, input: MacroInput) -> Result<Macro, DbError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DbError::NotFound {
                resource: "macro",
                id: id.to_owned(),
            })?;
        *row = Macro::from_input(row.id.clone(), input, row.created_at);
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|m| m.id != id);
        if rows.len() == before {
            return Err(DbError::NotFound {
                resource: "macro",
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}
