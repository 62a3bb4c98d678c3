//! Error types for simulation runs.

use hf_bus::BusError;
use thiserror::Error;

use crate::scheduler::RunState;

/// Errors surfaced by the scheduler. Each names the failing entity and tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Malformed topology, clock or agent wiring. Only returned from `start`.
    #[error("Configuration error in '{entity}' at tick {tick}: {what}")]
    Configuration {
        entity: String,
        tick: u64,
        what: String,
    },

    /// A component failed to update or produced non-finite state.
    #[error("Component '{entity}' failed at tick {tick}: {what}")]
    ComponentUpdate {
        entity: String,
        tick: u64,
        what: String,
    },

    /// An agent failed to execute or produced an invalid output.
    #[error("Agent '{entity}' failed at tick {tick}: {what}")]
    AgentExecution {
        entity: String,
        tick: u64,
        what: String,
    },

    #[error("Message bus error for '{entity}' at tick {tick}: {source}")]
    MessageBus {
        entity: String,
        tick: u64,
        source: BusError,
    },

    /// The run cannot step from its current state.
    #[error("Run is {state} at tick {tick}; cannot step")]
    InvalidState { tick: u64, state: RunState },
}

impl SimError {
    pub(crate) fn config(entity: impl Into<String>, what: impl ToString) -> Self {
        SimError::Configuration {
            entity: entity.into(),
            tick: 0,
            what: what.to_string(),
        }
    }

    /// Tick at which the error was raised.
    pub fn tick(&self) -> u64 {
        match self {
            SimError::Configuration { tick, .. }
            | SimError::ComponentUpdate { tick, .. }
            | SimError::AgentExecution { tick, .. }
            | SimError::MessageBus { tick, .. }
            | SimError::InvalidState { tick, .. } => *tick,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
