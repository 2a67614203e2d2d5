//! Error module orchestrator.
//!
//! Callers import error types from here while the definitions live in the
//! private `types` module.

mod types;

pub use types::{ConfigError, CoreError, Result};
