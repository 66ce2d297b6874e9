//! The order provider and periodic updater: the two built-in drivers of
//! routing requests beyond order release itself.

use crate::engine::SimAction;
use crate::model::OrderStatus;
use crate::simulation::Simulation;
use crate::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct PeriodicUpdater {
    pub period: Duration,
    pub stop_after_settled: bool,
}

impl Simulation {
    /// Schedules an `OrderRelease` for every order currently `UNREQUESTED`
    /// in the model, at its `release_date`. Called once by
    /// `Simulation::run` before the event loop starts; orders added to the
    /// model afterward are the caller's responsibility to release.
    pub(crate) fn seed_order_provider(&mut self) {
        let releases: Vec<_> = self
            .model
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Unrequested)
            .map(|o| (o.release_date, o.id.clone()))
            .collect();
        for (at, order) in releases {
            let at = if at < self.clock() { self.clock() } else { at };
            self.schedule(at, SimAction::OrderRelease { order });
        }
    }

    /// Enables the periodic updater: every `period` simulated units, raise
    /// a routing request. If `stop_after_settled` is set, the updater
    /// stops rescheduling itself once every order has reached a terminal
    /// status, rather than ticking forever.
    pub fn enable_periodic_updater(&mut self, period: Duration, stop_after_settled: bool) {
        self.periodic = Some(PeriodicUpdater { period, stop_after_settled });
        let at = self.clock() + period;
        self.schedule(at, SimAction::PeriodicTick);
    }

    pub(crate) fn periodic_tick(&mut self) {
        let Some(cfg) = self.periodic.clone() else {
            return;
        };
        tracing::debug!(time = %self.clock(), "periodic tick");
        self.request_for_routing();
        if cfg.stop_after_settled && self.model.orders.values().all(|o| o.status.is_terminal()) {
            return;
        }
        let at = self.clock() + cfg.period;
        self.schedule(at, SimAction::PeriodicTick);
    }
}
