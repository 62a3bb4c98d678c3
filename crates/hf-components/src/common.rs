//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use hf_core::numeric::ensure_finite;

/// Volumes below this are treated as empty (m^3).
pub const EPSILON_VOLUME: f64 = 1e-12;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

/// Ensure a parameter is finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<()> {
    check_finite(value, what)?;
    if value < 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

/// Clamp a value between min and max.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Move `current` toward `target` by at most `max_rate * dt`.
pub fn rate_limit(current: f64, target: f64, max_rate: f64, dt: f64) -> f64 {
    let max_step = max_rate * dt;
    current + clamp(target - current, -max_step, max_step)
}
