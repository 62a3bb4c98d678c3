//! Observation filters for digital twins.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Filter applied per state key before a twin publishes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TwinFilter {
    /// Publish the observed value unchanged.
    #[default]
    Raw,
    /// Exponential moving average seeded with the first observation.
    Ema { alpha: f64 },
}

impl TwinFilter {
    pub fn validate(&self) -> ControlResult<()> {
        match *self {
            TwinFilter::Raw => Ok(()),
            TwinFilter::Ema { alpha } => EmaFilter::new(alpha).map(|_| ()),
        }
    }
}

/// Exponential moving average: `y = alpha * x + (1 - alpha) * y_prev`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaFilter {
    alpha: f64,
    value: Option<f64>,
}

impl EmaFilter {
    /// `alpha` must lie in (0, 1]. `alpha == 1` passes values through.
    pub fn new(alpha: f64) -> ControlResult<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ControlError::InvalidParameter {
                what: "EMA alpha must lie in (0, 1]",
            });
        }
        Ok(Self { alpha, value: None })
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn apply(&mut self, x: f64) -> f64 {
        let y = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(y);
        y
    }
}
