//! Discrete time for both engines
//!
//! The simulator advances in steps; the evaluator counts negotiation rounds.
//! Both are plain counters measured against a fixed horizon, so one clock
//! type serves both.

use serde::{Deserialize, Serialize};

/// Counts discrete steps (or rounds) against a fixed horizon
///
/// The counter never rolls back. It may run past the horizon (the evaluator
/// keeps counting rounds after `max_rounds`); `progress()` saturates at 1.0.
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::StepClock;
///
/// let mut clock = StepClock::new(200);
/// assert_eq!(clock.current_step(), 0);
///
/// clock.advance();
/// assert_eq!(clock.current_step(), 1);
/// assert_eq!(clock.remaining(), 199);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepClock {
    /// Steps elapsed since start
    current_step: usize,
    /// Planned number of steps
    horizon: usize,
}

impl StepClock {
    /// Create a new clock
    ///
    /// # Panics
    /// Panics if `horizon` is zero. Engines validate their configuration
    /// before constructing a clock.
    pub fn new(horizon: usize) -> Self {
        assert!(horizon > 0, "horizon must be positive");
        Self {
            current_step: 0,
            horizon,
        }
    }

    /// Advance by one step
    pub fn advance(&mut self) {
        self.current_step += 1;
    }

    /// Steps elapsed since start
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Planned number of steps
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Steps left before the horizon (0 once reached or passed)
    pub fn remaining(&self) -> usize {
        self.horizon.saturating_sub(self.current_step)
    }

    /// True once the horizon has been reached
    ///
    /// # Example
    /// ```
    /// use agreement_simulator_core_rs::StepClock;
    ///
    /// let mut clock = StepClock::new(2);
    /// clock.advance();
    /// assert!(!clock.is_complete());
    /// clock.advance();
    /// assert!(clock.is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        self.current_step >= self.horizon
    }

    /// Fraction of the horizon elapsed, capped at 1.0
    pub fn progress(&self) -> f64 {
        (self.current_step as f64 / self.horizon as f64).min(1.0)
    }
}
