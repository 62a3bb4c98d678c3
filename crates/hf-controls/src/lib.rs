//! Control algorithms for hydroflow agents.
//!
//! This crate holds the pure decision laws used by the agent layer. Nothing
//! here knows about the message bus or components; agents feed values in and
//! publish or actuate what comes out.
//!
//! # Contents
//!
//! - [`PidController`]: positional PID with output clamping and integral
//!   rollback on saturation (anti-windup)
//! - [`HysteresisBand`]: two-threshold setpoint dispatch used by central
//!   dispatchers
//! - [`TwinFilter`]: per-key smoothing applied by digital twins
//!
//! All laws are deterministic: the same inputs in the same order give
//! bit-identical outputs.

pub mod error;
pub mod filter;
pub mod hysteresis;
pub mod pid;

pub use error::{ControlError, ControlResult};
pub use filter::{EmaFilter, TwinFilter};
pub use hysteresis::HysteresisBand;
pub use pid::{PidConfig, PidController, PidState};
