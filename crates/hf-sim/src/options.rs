//! Run options.

use serde::{Deserialize, Serialize};

/// What happens when an agent fails during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentFaultPolicy {
    /// Discard the agent's output, record a warning and keep running.
    #[default]
    Isolate,
    /// Fail the run.
    Fatal,
}

/// How the update and agent phases are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Fan phases out over the rayon pool. Results are identical to sequential.
    Parallel,
}

/// Options for simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub agent_faults: AgentFaultPolicy,
    pub execution: ExecutionMode,
    /// Record every N-th tick (decimation). 0 disables recording.
    pub record_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            agent_faults: AgentFaultPolicy::default(),
            execution: ExecutionMode::default(),
            record_every: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_defaults() {
        let opts = RunOptions::default();
        assert_eq!(opts.agent_faults, AgentFaultPolicy::Isolate);
        assert_eq!(opts.execution, ExecutionMode::Sequential);
        assert_eq!(opts.record_every, 1);
    }
}
