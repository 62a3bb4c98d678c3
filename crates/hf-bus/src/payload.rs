//! Message payload types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::topic::Topic;

/// Named numeric values captured from a component at one tick.
pub type StateSnapshot = BTreeMap<String, f64>;

/// Strategic command sent from a dispatcher to a local controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Command {
    /// New setpoint for the receiving controller.
    Setpoint(f64),
}

/// Payload carried by a bus message.
///
/// Closed set of variants per topic class: plain measurements, structured
/// state snapshots, and commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Payload {
    /// Single numeric signal.
    Scalar(f64),
    /// Structured component state.
    Snapshot(StateSnapshot),
    /// Control command.
    Command(Command),
}

impl Payload {
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    pub fn setpoint(value: f64) -> Self {
        Self::Command(Command::Setpoint(value))
    }

    /// Scalar value, if this is a scalar payload.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Look up a named value.
    ///
    /// Snapshots are indexed by key; scalars answer any key (they carry a
    /// single value); commands carry no observations.
    pub fn value_of(&self, key: &str) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Snapshot(map) => map.get(key).copied(),
            Self::Command(_) => None,
        }
    }

    /// Setpoint value, accepting either a setpoint command or a bare scalar.
    pub fn as_setpoint(&self) -> Option<f64> {
        match self {
            Self::Command(Command::Setpoint(v)) | Self::Scalar(v) => Some(*v),
            Self::Snapshot(_) => None,
        }
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<StateSnapshot> for Payload {
    fn from(value: StateSnapshot) -> Self {
        Self::Snapshot(value)
    }
}

impl From<Command> for Payload {
    fn from(value: Command) -> Self {
        Self::Command(value)
    }
}

/// A payload stamped with its topic and the tick it was published in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub topic: Topic,
    pub payload: Payload,
    pub published_at: u64,
}
