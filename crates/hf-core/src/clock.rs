//! Simulation clock and the explicit per-tick context.
//!
//! The clock is the only owner of "current tick" state. Components and agents
//! never read it directly; the scheduler hands them a [`TickContext`] value.

use crate::{HfError, HfResult};

/// Clock configuration for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockConfig {
    /// Fixed step size (seconds). Must be positive and finite.
    pub dt: f64,
    /// Number of ticks in the run.
    pub end_tick: u64,
}

impl ClockConfig {
    pub fn new(dt: f64, end_tick: u64) -> Self {
        Self { dt, end_tick }
    }

    pub fn validate(&self) -> HfResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(HfError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }
        Ok(())
    }
}

/// Read-only view of simulated time handed to every component and agent call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Index of the tick being executed (0-based).
    pub tick: u64,
    /// Step size (seconds).
    pub dt: f64,
    /// Simulated time at the start of the tick (seconds).
    pub time: f64,
}

/// Monotonic fixed-step clock.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    current_tick: u64,
    dt: f64,
    end_tick: u64,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> HfResult<Self> {
        config.validate()?;
        Ok(Self {
            current_tick: 0,
            dt: config.dt,
            end_tick: config.end_tick,
        })
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Simulated time at the current tick boundary.
    pub fn time(&self) -> f64 {
        self.current_tick as f64 * self.dt
    }

    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.end_tick
    }

    pub fn context(&self) -> TickContext {
        TickContext {
            tick: self.current_tick,
            dt: self.dt,
            time: self.time(),
        }
    }

    /// Move to the next tick. Saturates at `end_tick`.
    pub fn advance(&mut self) {
        if self.current_tick < self.end_tick {
            self.current_tick += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_rejects_bad_dt() {
        assert!(SimulationClock::new(ClockConfig::new(0.0, 10)).is_err());
        assert!(SimulationClock::new(ClockConfig::new(-1.0, 10)).is_err());
        assert!(SimulationClock::new(ClockConfig::new(f64::NAN, 10)).is_err());
    }

    #[test]
    fn clock_advances_to_end_and_stops() {
        let mut clock = SimulationClock::new(ClockConfig::new(0.5, 3)).unwrap();
        assert_eq!(clock.context().time, 0.0);
        for _ in 0..5 {
            clock.advance();
        }
        assert_eq!(clock.current_tick(), 3);
        assert!(clock.is_finished());
        assert_eq!(clock.time(), 1.5);
    }

    #[test]
    fn context_carries_tick_and_dt() {
        let mut clock = SimulationClock::new(ClockConfig::new(2.0, 10)).unwrap();
        clock.advance();
        let ctx = clock.context();
        assert_eq!(ctx.tick, 1);
        assert_eq!(ctx.dt, 2.0);
        assert_eq!(ctx.time, 2.0);
    }

    proptest! {
        #[test]
        fn ticks_and_time_never_go_backwards(
            dt in 1e-3f64..100.0,
            end_tick in 0u64..200,
            steps in 0usize..300,
        ) {
            let mut clock = SimulationClock::new(ClockConfig::new(dt, end_tick)).unwrap();
            let mut last = clock.context();
            for _ in 0..steps {
                clock.advance();
                let ctx = clock.context();
                prop_assert!(ctx.tick >= last.tick);
                prop_assert!(ctx.tick - last.tick <= 1);
                prop_assert!(ctx.time >= last.time);
                prop_assert!(ctx.tick <= end_tick);
                last = ctx;
            }
            prop_assert_eq!(clock.current_tick(), (steps as u64).min(end_tick));
        }
    }
}
