//! Topology validation errors.

use hf_core::{CompId, HfError};

/// Link graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two components share an identifier.
    DuplicateComponent { name: String },

    /// A component identifier is empty or otherwise unusable.
    InvalidName { what: &'static str },

    /// A link names a component that was never registered.
    UnknownComponent { name: String },

    /// A link refers to a component id outside the registry.
    InvalidCompRef { comp: CompId },

    /// A component links to itself.
    SelfLink { name: String },

    /// The same directed link was declared twice.
    DuplicateLink { from: String, to: String },

    /// Links form a cycle; feedback must go through agents instead.
    Cycle { through: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateComponent { name } => {
                write!(f, "Component '{}' is registered more than once", name)
            }
            GraphError::InvalidName { what } => write!(f, "Invalid component name: {}", what),
            GraphError::UnknownComponent { name } => {
                write!(f, "Link refers to unknown component '{}'", name)
            }
            GraphError::InvalidCompRef { comp } => {
                write!(f, "Link refers to non-existent component {}", comp)
            }
            GraphError::SelfLink { name } => {
                write!(f, "Component '{}' cannot link to itself", name)
            }
            GraphError::DuplicateLink { from, to } => {
                write!(f, "Link '{}' -> '{}' is declared more than once", from, to)
            }
            GraphError::Cycle { through } => {
                write!(
                    f,
                    "Physical links form a cycle through '{}'; use agent feedback instead",
                    through
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<HfError> for GraphError {
    fn from(err: HfError) -> Self {
        match err {
            HfError::DuplicateName { name } => GraphError::DuplicateComponent { name },
            HfError::UnknownName { name } => GraphError::UnknownComponent { name },
            HfError::InvalidArg { what } => GraphError::InvalidName { what },
            HfError::NonFinite { what, .. } => GraphError::InvalidName { what },
        }
    }
}
