//! Convenience result type alias.

use crate::error::AppError;

/// A specialized `Result` type for DDUP operations.
///
/// Every crate returns `AppResult<T>` at its public boundary so that
/// errors compose with `?` without per-crate conversions.
pub type AppResult<T> = Result<T, AppError>;
