//! Domain models with validation at construction
//!
//! Request bodies deserialize into loose payload types; validation turns
//! them into typed input or a `ValidationError`, never a panic.

pub mod validation;
pub mod macros;

pub use validation::ValidationError;
pub use macros::{Macro, MacroInput, MacroPayload, NumericInput};
