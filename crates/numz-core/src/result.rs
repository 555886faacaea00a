//! Convenience result type alias for the runtime.

use crate::error::AppError;

/// A specialized `Result` type for runtime operations.
pub type AppResult<T> = Result<T, AppError>;
