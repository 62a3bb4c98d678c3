//! The closed agent set and its extension point.

use std::collections::BTreeSet;
use std::fmt;

use hf_bus::Topic;

use crate::context::AgentContext;
use crate::dispatcher::CentralDispatcherAgent;
use crate::error::{AgentError, AgentResult};
use crate::layer::AgentLayer;
use crate::local::LocalControlAgent;
use crate::output::AgentOutput;
use crate::twin::DigitalTwinAgent;

/// User-supplied agent behavior.
pub trait CustomAgent: Send + Sync {
    fn id(&self) -> &str;

    fn layer(&self) -> AgentLayer;

    fn subscriptions(&self) -> BTreeSet<Topic>;

    fn publishes(&self) -> BTreeSet<Topic>;

    /// Opt out of the subscribe/publish disjointness check.
    fn delayed_feedback(&self) -> bool {
        false
    }

    fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput>;
}

/// Any agent the scheduler can run.
pub enum Agent {
    DigitalTwin(DigitalTwinAgent),
    LocalControl(LocalControlAgent),
    CentralDispatcher(CentralDispatcherAgent),
    Custom(Box<dyn CustomAgent>),
}

impl Agent {
    pub fn id(&self) -> &str {
        match self {
            Agent::DigitalTwin(a) => a.id(),
            Agent::LocalControl(a) => a.id(),
            Agent::CentralDispatcher(a) => a.id(),
            Agent::Custom(a) => a.id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Agent::DigitalTwin(_) => "digital_twin",
            Agent::LocalControl(_) => "local_control",
            Agent::CentralDispatcher(_) => "central_dispatcher",
            Agent::Custom(_) => "custom",
        }
    }

    pub fn layer(&self) -> AgentLayer {
        match self {
            Agent::DigitalTwin(_) => AgentLayer::Perception,
            Agent::LocalControl(_) => AgentLayer::Control,
            Agent::CentralDispatcher(a) => AgentLayer::Supervision {
                tier: a.config().tier,
            },
            Agent::Custom(a) => a.layer(),
        }
    }

    pub fn subscriptions(&self) -> BTreeSet<Topic> {
        match self {
            Agent::DigitalTwin(_) => BTreeSet::new(),
            Agent::LocalControl(a) => {
                let cfg = a.config();
                cfg.setpoint
                    .topic()
                    .into_iter()
                    .chain(cfg.process_variable.topic())
                    .cloned()
                    .collect()
            }
            Agent::CentralDispatcher(a) => a
                .config()
                .rules
                .iter()
                .map(|r| r.watch_topic.clone())
                .collect(),
            Agent::Custom(a) => a.subscriptions(),
        }
    }

    pub fn publishes(&self) -> BTreeSet<Topic> {
        match self {
            Agent::DigitalTwin(a) => BTreeSet::from([a.config().state_topic.clone()]),
            Agent::LocalControl(a) => a.config().output_topic.iter().cloned().collect(),
            Agent::CentralDispatcher(a) => a
                .config()
                .rules
                .iter()
                .map(|r| r.command_topic.clone())
                .collect(),
            Agent::Custom(a) => a.publishes(),
        }
    }

    pub fn delayed_feedback(&self) -> bool {
        match self {
            Agent::DigitalTwin(_) => false,
            Agent::LocalControl(a) => a.config().delayed_feedback,
            Agent::CentralDispatcher(a) => a.config().delayed_feedback,
            Agent::Custom(a) => a.delayed_feedback(),
        }
    }

    /// Check static wiring: subscriptions and publishes must not overlap
    /// unless the agent opted into delayed feedback.
    pub fn validate(&self) -> AgentResult<()> {
        if self.id().trim().is_empty() {
            return Err(AgentError::InvalidConfig {
                what: "agent id must not be empty".into(),
            });
        }
        if self.delayed_feedback() {
            return Ok(());
        }
        let publishes = self.publishes();
        match self.subscriptions().intersection(&publishes).next() {
            Some(topic) => Err(AgentError::FeedbackOverlap {
                topic: topic.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Run one tick and check that every publish targets a declared topic.
    pub fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let out = match self {
            Agent::DigitalTwin(a) => a.execute(ctx)?,
            Agent::LocalControl(a) => a.execute(ctx)?,
            Agent::CentralDispatcher(a) => a.execute(ctx)?,
            Agent::Custom(a) => a.execute(ctx)?,
        };
        if !out.publishes.is_empty() {
            let declared = self.publishes();
            if let Some((topic, _)) = out.publishes.iter().find(|(t, _)| !declared.contains(t)) {
                return Err(AgentError::UndeclaredTopic {
                    topic: topic.to_string(),
                });
            }
        }
        Ok(out)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("layer", &self.layer())
            .finish()
    }
}

impl From<DigitalTwinAgent> for Agent {
    fn from(a: DigitalTwinAgent) -> Self {
        Agent::DigitalTwin(a)
    }
}

impl From<LocalControlAgent> for Agent {
    fn from(a: LocalControlAgent) -> Self {
        Agent::LocalControl(a)
    }
}

impl From<CentralDispatcherAgent> for Agent {
    fn from(a: CentralDispatcherAgent) -> Self {
        Agent::CentralDispatcher(a)
    }
}

impl From<Box<dyn CustomAgent>> for Agent {
    fn from(a: Box<dyn CustomAgent>) -> Self {
        Agent::Custom(a)
    }
}
