//! Positional PID controller.
//!
//! Per call with `(setpoint, pv, dt)`:
//!
//! ```text
//! error      = setpoint - pv
//! integral'  = integral + error * dt
//! derivative = (error - previous_error) / dt      (0 on the first call)
//! raw        = kp * error + ki * integral' + kd * derivative
//! output     = clamp(raw, output_min, output_max)
//! ```
//!
//! When `raw` falls outside the bounds the step's integral accumulation is
//! discarded (anti-windup).

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// PID gains and output bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (per second).
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain (seconds).
    #[serde(default)]
    pub kd: f64,
    /// Minimum output value.
    pub output_min: f64,
    /// Maximum output value.
    pub output_max: f64,
}

impl PidConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(ControlError::InvalidParameter {
                what: "gains must be finite",
            });
        }
        if !(self.output_min.is_finite() && self.output_max.is_finite()) {
            return Err(ControlError::InvalidParameter {
                what: "output bounds must be finite",
            });
        }
        if self.output_min > self.output_max {
            return Err(ControlError::InvalidParameter {
                what: "output_min must not exceed output_max",
            });
        }
        Ok(())
    }
}

/// PID memory carried between calls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidState {
    /// Integral accumulator.
    pub integral: f64,
    /// Error seen on the previous call.
    pub previous_error: f64,
    /// False until the first successful call.
    pub initialized: bool,
}

/// PID controller owning its configuration and state.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    config: PidConfig,
    state: PidState,
}

impl PidController {
    pub fn new(config: PidConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: PidState::default(),
        })
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Forget the integral and derivative history.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    /// Compute the clamped output and advance the controller state.
    ///
    /// On error the state is left untouched.
    pub fn update(&mut self, setpoint: f64, pv: f64, dt: f64) -> ControlResult<f64> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ControlError::InvalidParameter {
                what: "dt must be positive and finite",
            });
        }
        if !setpoint.is_finite() || !pv.is_finite() {
            return Err(ControlError::InvalidParameter {
                what: "setpoint and process variable must be finite",
            });
        }

        let PidConfig {
            kp,
            ki,
            kd,
            output_min,
            output_max,
        } = self.config;

        let error = setpoint - pv;
        let tentative_integral = self.state.integral + error * dt;
        let derivative = if self.state.initialized {
            (error - self.state.previous_error) / dt
        } else {
            0.0
        };

        let output_raw = kp * error + ki * tentative_integral + kd * derivative;
        if !(error.is_finite() && tentative_integral.is_finite() && output_raw.is_finite()) {
            return Err(ControlError::InvalidParameter {
                what: "controller terms overflowed",
            });
        }
        let output = output_raw.clamp(output_min, output_max);

        // Anti-windup: keep the old integral while saturated
        if output == output_raw {
            self.state.integral = tentative_integral;
        }
        self.state.previous_error = error;
        self.state.initialized = true;

        Ok(output)
    }
}
