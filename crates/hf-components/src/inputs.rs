//! Double-buffered actuation inputs.

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};

/// Fixed set of named actuation inputs.
///
/// Agents stage values between updates; the component takes the latest staged
/// value at its next update. Staging twice before an update keeps the last value.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSlots {
    names: &'static [&'static str],
    staged: Vec<Option<f64>>,
}

impl InputSlots {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            staged: vec![None; names.len()],
        }
    }

    /// An empty set for components without actuation.
    pub fn none() -> Self {
        Self::new(&[])
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn stage(&mut self, name: &str, value: f64) -> ComponentResult<()> {
        let Some(i) = self.names.iter().position(|n| *n == name) else {
            return Err(ComponentError::UnknownInput {
                name: name.to_string(),
            });
        };
        check_finite(value, "actuation input")?;
        self.staged[i] = Some(value);
        Ok(())
    }

    /// Consume the staged value for `name`, if any.
    pub fn take(&mut self, name: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| *n == name)?;
        self.staged[i].take()
    }

    pub fn has_staged(&self) -> bool {
        self.staged.iter().any(Option::is_some)
    }
}
