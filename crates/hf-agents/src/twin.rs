//! Digital twin: mirrors a component's sensed state onto the bus.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use hf_bus::{StateSnapshot, Topic};
use hf_controls::{EmaFilter, TwinFilter};
use serde::{Deserialize, Serialize};

use crate::context::AgentContext;
use crate::error::{AgentError, AgentResult};
use crate::output::AgentOutput;

/// Digital twin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalTwinConfig {
    pub id: String,
    /// Component to observe.
    pub component: String,
    /// Topic the snapshot is published on.
    pub state_topic: Topic,
    /// Subset of state keys to publish. All keys when absent.
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub filter: TwinFilter,
}

/// Perception agent publishing a (optionally smoothed) state snapshot each tick.
#[derive(Debug, Clone)]
pub struct DigitalTwinAgent {
    config: DigitalTwinConfig,
    filters: BTreeMap<String, EmaFilter>,
}

impl DigitalTwinAgent {
    pub fn new(config: DigitalTwinConfig) -> AgentResult<Self> {
        config.filter.validate()?;
        if config.keys.as_ref().is_some_and(|k| k.is_empty()) {
            return Err(AgentError::InvalidConfig {
                what: format!("twin '{}' selects no state keys", config.id),
            });
        }
        Ok(Self {
            config,
            filters: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &DigitalTwinConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    fn filtered(&mut self, key: &str, value: f64) -> AgentResult<f64> {
        match self.config.filter {
            TwinFilter::Raw => Ok(value),
            TwinFilter::Ema { alpha } => {
                let filter = match self.filters.entry(key.to_string()) {
                    Entry::Occupied(e) => e.into_mut(),
                    Entry::Vacant(e) => e.insert(EmaFilter::new(alpha)?),
                };
                Ok(filter.apply(value))
            }
        }
    }

    pub fn execute(&mut self, ctx: &AgentContext<'_>) -> AgentResult<AgentOutput> {
        let component = &self.config.component;
        let state = ctx
            .components
            .state_of(component)
            .ok_or_else(|| AgentError::UnknownComponent {
                component: component.clone(),
            })?;

        let observed: Vec<(String, f64)> = match &self.config.keys {
            None => state.iter().map(|(k, v)| (k.to_string(), v)).collect(),
            Some(keys) => keys
                .iter()
                .map(|key| {
                    state
                        .get(key)
                        .map(|v| (key.clone(), v))
                        .ok_or_else(|| AgentError::MissingState {
                            component: component.clone(),
                            key: key.clone(),
                        })
                })
                .collect::<AgentResult<_>>()?,
        };

        let mut snapshot = StateSnapshot::new();
        for (key, value) in observed {
            let value = self.filtered(&key, value)?;
            snapshot.insert(key, value);
        }

        let mut out = AgentOutput::new();
        out.publish(self.config.state_topic.clone(), snapshot);
        Ok(out)
    }
}
