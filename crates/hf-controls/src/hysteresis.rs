//! Two-threshold setpoint dispatch.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Hysteresis band used by central dispatchers.
///
/// Below `low_level` the dispatcher asks for `high_setpoint`, above
/// `high_level` for `low_setpoint`. Inside the band (bounds inclusive) it
/// holds and issues nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HysteresisBand {
    pub low_level: f64,
    pub high_level: f64,
    pub low_setpoint: f64,
    pub high_setpoint: f64,
}

impl HysteresisBand {
    pub fn new(
        low_level: f64,
        high_level: f64,
        low_setpoint: f64,
        high_setpoint: f64,
    ) -> ControlResult<Self> {
        let band = Self {
            low_level,
            high_level,
            low_setpoint,
            high_setpoint,
        };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> ControlResult<()> {
        let values = [
            self.low_level,
            self.high_level,
            self.low_setpoint,
            self.high_setpoint,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ControlError::InvalidParameter {
                what: "hysteresis band values must be finite",
            });
        }
        if self.low_level > self.high_level {
            return Err(ControlError::InvalidParameter {
                what: "low_level must not exceed high_level",
            });
        }
        Ok(())
    }

    /// Setpoint to command for observation `v`, or `None` to hold.
    pub fn decide(&self, v: f64) -> Option<f64> {
        if v < self.low_level {
            Some(self.high_setpoint)
        } else if v > self.high_level {
            Some(self.low_setpoint)
        } else {
            None
        }
    }
}
