//! Linear-reservoir canal reach.

use hf_core::TickContext;
use serde::{Deserialize, Serialize};

use crate::common::{check_non_negative, check_positive};
use crate::error::ComponentResult;
use crate::inputs::InputSlots;
use crate::state::StateMap;
use crate::traits::{ExternalInputs, Params, PhysicalComponent};

/// Canal parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanalParams {
    /// Storage constant (1/s): outflow = k * volume.
    pub k: f64,
    /// Plan area (m^2) for the level readout.
    pub surface_area: f64,
}

/// Canal reach routed as a linear store.
///
/// State: `volume`, `water_level`, `inflow`, `outflow`. No actuation inputs.
#[derive(Debug, Clone)]
pub struct Canal {
    id: String,
    config: CanalParams,
    params: Params,
    state: StateMap,
    inputs: InputSlots,
}

impl Canal {
    pub fn new(
        id: impl Into<String>,
        config: CanalParams,
        initial_volume: f64,
    ) -> ComponentResult<Self> {
        check_positive(config.k, "k must be positive")?;
        check_positive(config.surface_area, "surface_area must be positive")?;
        check_non_negative(initial_volume, "initial volume must be non-negative")?;

        let state = StateMap::with_keys(&[
            ("volume", initial_volume),
            ("water_level", initial_volume / config.surface_area),
            ("inflow", 0.0),
            ("outflow", 0.0),
        ])?;
        let mut params = Params::new();
        params.insert("k".into(), config.k.into());
        params.insert("surface_area".into(), config.surface_area.into());

        Ok(Self {
            id: id.into(),
            config,
            params,
            state,
            inputs: InputSlots::none(),
        })
    }
}

impl PhysicalComponent for Canal {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "canal"
    }

    fn state(&self) -> &StateMap {
        &self.state
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn update(&mut self, ctx: &TickContext, inputs: &ExternalInputs) -> ComponentResult<()> {
        let volume = self.state.get("volume").unwrap_or(0.0) + inputs.inflow * ctx.dt;
        // k*dt >= 1 would drain more than the reach holds.
        let outflow = (self.config.k * volume).min(volume / ctx.dt).max(0.0);
        let volume = (volume - outflow * ctx.dt).max(0.0);

        self.state.set("volume", volume)?;
        self.state.set("water_level", volume / self.config.surface_area)?;
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
