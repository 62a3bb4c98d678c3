//! Storage reservoir with a commanded release.

use hf_core::TickContext;
use serde::{Deserialize, Serialize};

use crate::common::{check_non_negative, check_positive, EPSILON_VOLUME};
use crate::error::ComponentResult;
use crate::inputs::InputSlots;
use crate::state::StateMap;
use crate::traits::{ExternalInputs, Params, PhysicalComponent};

const INPUTS: &[&str] = &["release"];

/// Reservoir parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservoirParams {
    /// Plan area (m^2). Level = volume / surface_area.
    pub surface_area: f64,
    /// Initial commanded release (m^3/s).
    #[serde(default)]
    pub release: f64,
}

/// Prismatic storage: inflow accumulates, release drains while water remains.
///
/// State: `volume`, `water_level`, `inflow`, `outflow`. Actuation: `release`.
#[derive(Debug, Clone)]
pub struct Reservoir {
    id: String,
    surface_area: f64,
    release: f64,
    params: Params,
    state: StateMap,
    inputs: InputSlots,
}

impl Reservoir {
    pub fn new(
        id: impl Into<String>,
        params: ReservoirParams,
        initial_volume: f64,
    ) -> ComponentResult<Self> {
        check_positive(params.surface_area, "surface_area must be positive")?;
        check_non_negative(params.release, "release must be non-negative")?;
        check_non_negative(initial_volume, "initial volume must be non-negative")?;

        let state = StateMap::with_keys(&[
            ("volume", initial_volume),
            ("water_level", initial_volume / params.surface_area),
            ("inflow", 0.0),
            ("outflow", 0.0),
        ])?;
        let mut map = Params::new();
        map.insert("surface_area".into(), params.surface_area.into());
        map.insert("release".into(), params.release.into());

        Ok(Self {
            id: id.into(),
            surface_area: params.surface_area,
            release: params.release,
            params: map,
            state,
            inputs: InputSlots::new(INPUTS),
        })
    }

    /// Release currently commanded.
    pub fn release(&self) -> f64 {
        self.release
    }
}

impl PhysicalComponent for Reservoir {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "reservoir"
    }

    fn state(&self) -> &StateMap {
        &self.state
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn update(&mut self, ctx: &TickContext, inputs: &ExternalInputs) -> ComponentResult<()> {
        if let Some(release) = self.inputs.take("release") {
            self.release = release.max(0.0);
        }

        let volume = self.state.get("volume").unwrap_or(0.0) + inputs.inflow * ctx.dt;
        let available = if volume > EPSILON_VOLUME {
            volume / ctx.dt
        } else {
            0.0
        };
        let outflow = self.release.min(available);
        let volume = (volume - outflow * ctx.dt).max(0.0);

        self.state.set("volume", volume)?;
        self.state.set("water_level", volume / self.surface_area)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(dt: f64) -> TickContext {
        TickContext {
            tick: 0,
            dt,
            time: 0.0,
        }
    }

    fn reservoir(volume: f64, release: f64) -> Reservoir {
        Reservoir::new(
            "res",
            ReservoirParams {
                surface_area: 10.0,
                release,
            },
            volume,
        )
        .unwrap()
    }

    #[test]
    fn level_follows_volume() {
        let res = reservoir(50.0, 0.0);
        assert_eq!(res.state().get("water_level"), Some(5.0));
    }

    #[test]
    fn mass_balance() {
        let mut res = reservoir(50.0, 3.0);
        res.update(&ctx(2.0), &ExternalInputs::new(1.0, 1)).unwrap();
        // 50 + 1*2 - 3*2
        assert_eq!(res.state().get("volume"), Some(46.0));
        assert_eq!(res.outflow(), 3.0);
    }

    #[test]
    fn release_limited_by_available_water() {
        let mut res = reservoir(4.0, 10.0);
        res.update(&ctx(1.0), &ExternalInputs::default()).unwrap();
        assert_eq!(res.outflow(), 4.0);
        assert_eq!(res.state().get("volume"), Some(0.0));

        res.update(&ctx(1.0), &ExternalInputs::default()).unwrap();
        assert_eq!(res.outflow(), 0.0);
    }

    #[test]
    fn staged_release_applies_on_next_update() {
        let mut res = reservoir(100.0, 0.0);
        res.stage_input("release", 5.0).unwrap();
        assert_eq!(res.release(), 0.0);
        res.update(&ctx(1.0), &ExternalInputs::default()).unwrap();
        assert_eq!(res.release(), 5.0);
        assert_eq!(res.outflow(), 5.0);
    }

    #[test]
    fn rejects_bad_params() {
        let bad = ReservoirParams {
            surface_area: 0.0,
            release: 0.0,
        };
        assert!(Reservoir::new("res", bad, 1.0).is_err());
        let good = ReservoirParams {
            surface_area: 1.0,
            release: 0.0,
        };
        assert!(Reservoir::new("res", good, -1.0).is_err());
    }

    #[test]
    fn unknown_input_rejected() {
        let mut res = reservoir(1.0, 0.0);
        assert!(res.stage_input("target_opening", 0.5).is_err());
        assert_eq!(res.actuation_inputs(), &["release"]);
    }
}
