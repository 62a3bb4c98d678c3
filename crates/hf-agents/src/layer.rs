//! Agent execution layers.

use serde::{Deserialize, Serialize};

/// Ordering class of an agent within a tick.
///
/// Perception runs first, then control, then supervision tiers in ascending
/// order. Agents in the same layer run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentLayer {
    Perception,
    Control,
    Supervision { tier: u32 },
}

impl std::fmt::Display for AgentLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentLayer::Perception => write!(f, "perception"),
            AgentLayer::Control => write!(f, "control"),
            AgentLayer::Supervision { tier } => write!(f, "supervision[{}]", tier),
        }
    }
}
