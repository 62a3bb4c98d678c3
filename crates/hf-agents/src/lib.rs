//! hf-agents: software agents that sense, decide and actuate.
//!
//! Agents form a closed set of variants plus one extension point:
//! - [`DigitalTwinAgent`] (perception): mirrors a component's state onto the bus
//! - [`LocalControlAgent`] (control): runs a PID loop against a setpoint
//! - [`CentralDispatcherAgent`] (supervision): issues setpoint commands from
//!   hysteresis bands over observed values
//! - [`CustomAgent`]: user-supplied trait object
//!
//! An agent never mutates the bus or components directly. It reads an
//! [`AgentContext`] and returns an [`AgentOutput`] that the scheduler validates
//! and commits in deterministic order.

pub mod agent;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod layer;
pub mod local;
pub mod output;
pub mod twin;

pub use agent::{Agent, CustomAgent};
pub use config::{ActuatorTarget, DispatchRule, PvSource, SetpointSource};
pub use context::{AgentContext, ComponentView};
pub use dispatcher::{CentralDispatcherAgent, CentralDispatcherConfig};
pub use error::{AgentError, AgentResult};
pub use layer::AgentLayer;
pub use local::{LocalControlAgent, LocalControlConfig};
pub use output::{Actuation, AgentOutput};
pub use twin::{DigitalTwinAgent, DigitalTwinConfig};
