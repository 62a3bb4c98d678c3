//! hf-components: physical component contract and reference water components.
//!
//! Provides:
//! - `PhysicalComponent`, the plugin contract the scheduler drives once per tick
//! - `StateMap`, a state container whose keys are fixed at construction
//! - `InputSlots`, double-buffered actuation inputs staged by agents
//! - Reference models with deliberately simple water-balance laws:
//!   [`Reservoir`], [`Gate`] and [`Canal`]
//!
//! # Example
//!
//! ```
//! use hf_components::{ExternalInputs, PhysicalComponent, Reservoir, ReservoirParams};
//! use hf_core::TickContext;
//!
//! let params = ReservoirParams { surface_area: 100.0, release: 2.0 };
//! let mut res = Reservoir::new("reservoir_1", params, 500.0).unwrap();
//!
//! let ctx = TickContext { tick: 0, dt: 1.0, time: 0.0 };
//! res.update(&ctx, &ExternalInputs::new(1.0, 1)).unwrap();
//!
//! assert_eq!(res.state().get("volume"), Some(499.0));
//! assert_eq!(res.outflow(), 2.0);
//! ```

pub mod canal;
pub mod common;
pub mod error;
pub mod gate;
pub mod inputs;
pub mod reservoir;
pub mod state;
pub mod traits;

pub use canal::{Canal, CanalParams};
pub use error::{ComponentError, ComponentResult};
pub use gate::{Gate, GateParams};
pub use inputs::InputSlots;
pub use reservoir::{Reservoir, ReservoirParams};
pub use state::StateMap;
pub use traits::{ExternalInputs, ParamValue, Params, PhysicalComponent};
