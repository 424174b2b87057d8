//! Repository implementations for database access
//!
//! Handlers talk to `MacroStore`; `PgMacroStore` is the production
//! implementation.

pub mod macros;
#[cfg(test)]
pub mod memory;

pub use macros::{DbError, MacroStore, PgMacroStore};
