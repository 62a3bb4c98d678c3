//! Sluice gate with a rate-limited opening.

use hf_core::TickContext;
use serde::{Deserialize, Serialize};

use crate::common::{check_non_negative, check_positive, clamp, rate_limit};
use crate::error::{ComponentError, ComponentResult};
use crate::inputs::InputSlots;
use crate::state::StateMap;
use crate::traits::{ExternalInputs, Params, PhysicalComponent};

const INPUTS: &[&str] = &["target_opening"];

/// Gate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateParams {
    /// Fully open position (m).
    pub max_opening: f64,
    /// Opening slew limit (m/s).
    pub max_rate_of_change: f64,
    /// Flow through the fully open gate (m^3/s).
    pub max_flow_rate: f64,
}

/// Gate whose flow scales linearly with opening.
///
/// The opening moves toward the last commanded target at most
/// `max_rate_of_change * dt` per tick. With upstream links the gate passes at
/// most what flows in; without them it acts as an intake from an unlimited source.
///
/// State: `opening`, `target_opening`, `inflow`, `outflow`. Actuation: `target_opening`.
#[derive(Debug, Clone)]
pub struct Gate {
    id: String,
    config: GateParams,
    params: Params,
    state: StateMap,
    inputs: InputSlots,
}

impl Gate {
    pub fn new(id: impl Into<String>, config: GateParams, opening: f64) -> ComponentResult<Self> {
        check_positive(config.max_opening, "max_opening must be positive")?;
        check_positive(config.max_rate_of_change, "max_rate_of_change must be positive")?;
        check_non_negative(config.max_flow_rate, "max_flow_rate must be non-negative")?;
        if !(0.0..=config.max_opening).contains(&opening) {
            return Err(ComponentError::InvalidArg {
                what: "initial opening must lie in [0, max_opening]",
            });
        }

        let state = StateMap::with_keys(&[
            ("opening", opening),
            ("target_opening", opening),
            ("inflow", 0.0),
            ("outflow", 0.0),
        ])?;
        let mut params = Params::new();
        params.insert("max_opening".into(), config.max_opening.into());
        params.insert("max_rate_of_change".into(), config.max_rate_of_change.into());
        params.insert("max_flow_rate".into(), config.max_flow_rate.into());

        Ok(Self {
            id: id.into(),
            config,
            params,
            state,
            inputs: InputSlots::new(INPUTS),
        })
    }

    pub fn opening(&self) -> f64 {
        self.state.get("opening").unwrap_or(0.0)
    }

    /// Flow the gate can pass at a given opening.
    pub fn capacity(&self, opening: f64) -> f64 {
        self.config.max_flow_rate * opening / self.config.max_opening
    }
}

impl PhysicalComponent for Gate {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "gate"
    }

    fn state(&self) -> &StateMap {
        &self.state
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn update(&mut self, ctx: &TickContext, inputs: &ExternalInputs) -> ComponentResult<()> {
        if let Some(target) = self.inputs.take("target_opening") {
            self.state.set(
                "target_opening",
                clamp(target, 0.0, self.config.max_opening),
            )?;
        }
        let target = self.state.get("target_opening").unwrap_or(0.0);

        let opening = clamp(
            rate_limit(
                self.opening(),
                target,
                self.config.max_rate_of_change,
                ctx.dt,
            ),
            0.0,
            self.config.max_opening,
        );
        let capacity = self.capacity(opening);
        let outflow = if inputs.has_upstream() {
            capacity.min(inputs.inflow.max(0.0))
        } else {
            capacity
        };

        self.state.set("opening", opening)?;
        self.state.set("inflow", inputs.inflow)?;
        self.state.set("outflow", outflow)?;
        Ok(())
    }

    fn actuation_inputs(&self) -> &[&'static str] {
        self.inputs.names()
    }

    fn stage_input(&mut self, name: &str, value: f64) -> ComponentResult<()> {
        self.inputs.stage(name, value)
    }
}
