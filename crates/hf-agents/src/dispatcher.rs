//! Central dispatcher: strategic setpoint commands from hysteresis bands.

use hf_bus::Payload;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DispatchRule;
use crate::context::AgentContext;
use crate::error::{AgentError, AgentResult};
use crate::output::AgentOutput;

/// Central dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralDispatcherConfig {
    pub id: String,
    /// Supervision tier. Higher tiers run after lower ones in a tick.
    #[serde(default)]
    pub tier: u32,
    pub rules: Vec<DispatchRule>,
    #[serde(default)]
    pub delayed_feedback: bool,
}

/// Supervision agent evaluating each rule against its watched topic.
///
/// A rule whose observation lies outside its band publishes a setpoint
/// command every tick, even when the value repeats.
#[derive(Debug, Clone)]
pub struct CentralDispatcherAgent {
    config: CentralDispatcherConfig,
}

impl CentralDispatcherAgent {
    pub fn new(config: CentralDispatcherConfig) -> AgentResult<Self> {
        if config.rules.is_empty() {
            return Err(AgentError::InvalidConfig {
                what: format!("dispatcher '{}' has no rules", config.id),
            });
        }
        for rule in &config.rules {
            rule.band.validate()?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CentralDispatcherConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let mut out = AgentOutput::new();
        for rule in &self.config.rules {
            let Some(observed) = ctx.read_value(&rule.watch_topic, &rule.observation_key) else {
                continue;
            };
            if let Some(setpoint) = rule.band.decide(observed) {
                debug!(
                    agent = %self.config.id,
                    tick = ctx.tick.tick,
                    observed,
                    setpoint,
                    topic = %rule.command_topic,
                    "dispatching setpoint"
                );
                out.publish(rule.command_topic.clone(), Payload::setpoint(setpoint));
            }
        }
        Ok(out)
    }
}
