//! Convenience result type alias for meshpipe.

use crate::error::AppError;

/// A specialized `Result` type for meshpipe operations.
pub type AppResult<T> = Result<T, AppError>;
