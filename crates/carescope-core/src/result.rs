//! Convenience result type alias for CareScope.

use crate::error::AppError;

/// A specialized `Result` type for CareScope operations.
pub type AppResult<T> = Result<T, AppError>;
