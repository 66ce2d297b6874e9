//! Simulation-wide configuration, validated once up front rather than
//! threaded through ad hoc constructor arguments.

use crate::error::ConfigError;
use crate::time::{Duration, SimTime};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start_time: SimTime,
    /// Explicit horizon; `None` runs until no runnable process and no
    /// future event remain.
    pub stop_at: Option<SimTime>,
    /// Whether `request_order` raises a routing request by default when
    /// an order is released.
    pub decision_on_order_request: bool,
    /// The `ε` the coordinator quiesces for before snapshotting; must be
    /// strictly positive so a coordinator tick always sorts after every
    /// event already scheduled for `now`.
    pub quiescence_epsilon: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_time: SimTime::ZERO,
            stop_at: None,
            decision_on_order_request: true,
            quiescence_epsilon: 1e-9,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiescence_epsilon <= 0.0 {
            return Err(ConfigError::NegativeDuration(self.quiescence_epsilon));
        }
        Ok(())
    }
}
