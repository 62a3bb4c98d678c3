//! Agent error types.

use hf_controls::ControlError;
use thiserror::Error;

pub type AgentResult<T> = Result<T, AgentError>;

/// Errors raised while configuring or executing an agent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Invalid agent configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Topic '{topic}' is both subscribed and published without delayed feedback")]
    FeedbackOverlap { topic: String },

    #[error("Publish to undeclared topic '{topic}'")]
    UndeclaredTopic { topic: String },

    #[error("Unknown component '{component}'")]
    UnknownComponent { component: String },

    #[error("Component '{component}' has no state '{key}'")]
    MissingState { component: String, key: String },

    #[error("Invalid actuation of '{component}.{input}': {what}")]
    InvalidActuation {
        component: String,
        input: String,
        what: &'static str,
    },

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Agent failed: {what}")]
    Failed { what: String },
}
