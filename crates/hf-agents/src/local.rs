//! Local control: tactical PID execution against a setpoint.

use hf_bus::Topic;
use hf_controls::{PidConfig, PidController};
use serde::{Deserialize, Serialize};

use crate::config::{ActuatorTarget, PvSource, SetpointSource};
use crate::context::AgentContext;
use crate::error::AgentResult;
use crate::output::AgentOutput;

/// Local control agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalControlConfig {
    pub id: String,
    pub pid: PidConfig,
    pub setpoint: SetpointSource,
    pub process_variable: PvSource,
    pub actuator: ActuatorTarget,
    /// Also publish the controller output as a scalar.
    #[serde(default)]
    pub output_topic: Option<Topic>,
    /// Allow subscribing to a topic the agent also publishes.
    #[serde(default)]
    pub delayed_feedback: bool,
}

/// PID agent: setpoint from config or commands, PV from a topic or a component,
/// output staged on one actuation input.
#[derive(Debug, Clone)]
pub struct LocalControlAgent {
    config: LocalControlConfig,
    pid: PidController,
    setpoint: Option<f64>,
}

impl LocalControlAgent {
    pub fn new(config: LocalControlConfig) -> AgentResult<Self> {
        let pid = PidController::new(config.pid)?;
        let setpoint = config.setpoint.initial();
        Ok(Self {
            config,
            pid,
            setpoint,
        })
    }

    pub fn config(&self) -> &LocalControlConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Setpoint currently held.
    pub fn setpoint(&self) -> Option<f64> {
        self.setpoint
    }

    pub fn controller(&self) -> &PidController {
        &self.pid
    }

    fn process_variable(&self, ctx: &AgentContext<'_>) -> Option<f64> {
        match &self.config.process_variable {
            PvSource::Topic { topic, key } => ctx.read_value(topic, key),
            PvSource::Component { component, key } => ctx.component_value(component, key),
        }
    }

    pub fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        if let Some(topic) = self.config.setpoint.topic() {
            if let Some(sp) = ctx.read_setpoint(topic) {
                self.setpoint = Some(sp);
            }
        }

        let mut out = AgentOutput::new();
        let (Some(setpoint), Some(pv)) = (self.setpoint, self.process_variable(ctx)) else {
            return Ok(out);
        };

        let command = self.pid.update(setpoint, pv, ctx.tick.dt)?;
        let target = &self.config.actuator;
        out.actuate(target.component.as_str(), target.input.as_str(), command);
        if let Some(topic) = &self.config.output_topic {
            out.publish(topic.clone(), command);
        }
        Ok(out)
    }
}
