//! hf-core: stable foundation for hydroflow.
//!
//! Contains:
//! - numeric (finiteness checks)
//! - ids (compact registry IDs + name interning)
//! - clock (simulation clock and the per-tick context)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod ids;
pub mod numeric;

pub use clock::{ClockConfig, SimulationClock, TickContext};
pub use error::{HfError, HfResult};
pub use ids::*;
pub use numeric::*;
