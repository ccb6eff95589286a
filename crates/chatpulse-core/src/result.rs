//! Convenience result type alias for chatpulse.

use crate::error::AppError;

/// A specialized `Result` type for chatpulse operations.
pub type AppResult<T> = Result<T, AppError>;
