//! Error types for control operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A gain, bound, step size or input is unusable.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },
}
