//! Common types and utilities.

/// Invoker error type.
pub use crate::error::Error;

/// Invoker result type.
pub type Result<T> = core::result::Result<T, Error>;
