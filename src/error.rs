//! Error types for the exercise generation core.

use thiserror::Error;

/// Result type alias using ExerciseError.
pub type Result<T> = std::result::Result<T, ExerciseError>;

/// Errors raised by the pure generation core.
///
/// Malformed markup and empty documents are not errors: unmatched tag-like
/// text stays literal and an empty document simply yields no blanks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExerciseError {
    #[error("invalid configuration: every_nth must be at least 1, got {every_nth}")]
    InvalidConfiguration { every_nth: usize },

    #[error("invalid configuration: no variants configured")]
    NoVariants,

    #[error("invalid configuration: every_nth {every_nth} is listed more than once")]
    DuplicateVariant { every_nth: usize },
}
