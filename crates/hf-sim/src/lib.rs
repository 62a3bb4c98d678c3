//! Discrete time-stepped scheduler for hydroflow networks.
//!
//! Provides:
//! - `TopologyBuilder` to assemble components, links and agents
//! - `start` / `RunHandle` run control (step, run to completion, stop)
//! - Deterministic per-tick phases: component update, bus advance, agent
//!   execution, ordered commit
//! - Optional rayon fan-out of the update and agent phases
//! - Decimated state recording

pub mod error;
pub mod options;
pub mod record;
pub mod scheduler;
pub mod topology;

mod view;

pub use error::{SimError, SimResult};
pub use options::{AgentFaultPolicy, ExecutionMode, RunOptions};
pub use record::{RecordedComponent, SimRecord};
pub use scheduler::{AgentWarning, FinalResult, RunHandle, RunState, TickResult, start};
pub use topology::{Topology, TopologyBuilder};
