//! Command implementations for the macrodesk CLI

pub mod serve;

pub use serve::run_serve;
