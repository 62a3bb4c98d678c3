//! Error types for component operations.

use hf_core::HfError;
use thiserror::Error;

/// Errors that can occur while building or updating a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown state key '{key}'")]
    UnknownStateKey { key: String },

    #[error("Unknown actuation input '{name}'")]
    UnknownInput { name: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<HfError> for ComponentError {
    fn from(e: HfError) -> Self {
        match e {
            HfError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            HfError::InvalidArg { what } => ComponentError::InvalidArg { what },
            HfError::DuplicateName { name } | HfError::UnknownName { name } => {
                ComponentError::UnknownStateKey { key: name }
            }
        }
    }
}
