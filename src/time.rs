//! Simulated time. The engine only ever advances a single rational clock.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A duration in simulated units. Durations must be `>= 0` at every call
/// site that accepts one; callers validate that, `Duration` itself is a
/// plain alias.
pub type Duration = f64;

/// A point on the simulated clock. Totally ordered so it can key the
/// event queue and be compared across vehicles/orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct SimTime(OrderedFloat<f64>);

impl SimTime {
    pub const ZERO: SimTime = SimTime(OrderedFloat(0.0));

    pub fn new(t: f64) -> Self {
        Self(OrderedFloat(t))
    }

    pub fn as_f64(self) -> f64 {
        self.0 .0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 .0)
    }
}

impl From<f64> for SimTime {
    fn from(t: f64) -> Self {
        Self::new(t)
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;
    fn add(self, rhs: Duration) -> SimTime {
        SimTime::new(self.as_f64() + rhs)
    }
}

impl AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for SimTime {
    type Output = Duration;
    fn sub(self, rhs: SimTime) -> Duration {
        self.as_f64() - rhs.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_value() {
        assert!(SimTime::new(1.0) < SimTime::new(2.0));
        assert_eq!(SimTime::ZERO, SimTime::new(0.0));
    }

    #[test]
    fn add_duration_and_subtract_back() {
        let t = SimTime::new(10.0) + 5.0;
        assert_eq!(t, SimTime::new(15.0));
        assert_eq!(t - SimTime::new(10.0), 5.0);
    }

    #[test]
    fn add_assign_advances_in_place() {
        let mut t = SimTime::ZERO;
        t += 3.5;
        t += 1.5;
        assert_eq!(t, SimTime::new(5.0));
    }
}
