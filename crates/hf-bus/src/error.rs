//! Error types for bus operations.

use thiserror::Error;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Errors raised synchronously by the bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Topic string does not follow the `segment/segment` grammar.
    #[error("Malformed topic '{topic}': {reason}")]
    MalformedTopic { topic: String, reason: &'static str },
}
