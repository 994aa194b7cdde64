//! Error types for grid planning.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while turning a region into sampling points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("At least 2 points are required along the major axis, got {0}")]
    TooFewPoints(usize),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
