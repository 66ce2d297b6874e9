//! Observable hooks and the routing callback seam.
//!
//! Traits with default no-op methods that the engine calls at fixed
//! points, rather than exposing the scheduler itself to user code.
//! `preservice_delay` returns a duration to wait before service starts
//! rather than an arbitrary suspension, and `service_plan` returns the
//! sequencing of unload/load steps rather than driving the stepping
//! itself, which the engine always does. The default `service_plan` is
//! unload first, then load.

use crate::model::{LocationId, OrderId, Visit};
use crate::time::Duration;

/// The narrow surface hooks get back into the running simulation: enough
/// to read the clock and to request a routing decision, nothing else.
/// Kept separate from `Simulation` itself so hook implementors don't need
/// to see (or be coupled to) the engine's internals.
pub trait SimulationControl {
    fn now(&self) -> crate::time::SimTime;
    fn request_for_routing(&mut self);
}

/// One step of the default service procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStep {
    Unload(OrderId),
    Load(OrderId),
}

/// Per-vehicle overridable behavior. All methods are no-ops (or the
/// spec's stated default) unless overridden.
pub trait VehicleHooks {
    fn travel_time(&mut self, _origin: &LocationId, _destination: &LocationId) -> Duration {
        0.0
    }

    fn travel_distance(&mut self, _origin: &LocationId, _destination: &LocationId) -> f64 {
        0.0
    }

    fn on_arrival(&mut self, _ctx: &mut dyn SimulationControl) {}
    fn on_service_start(&mut self, _ctx: &mut dyn SimulationControl) {}
    fn on_service_finish(&mut self, _ctx: &mut dyn SimulationControl) {}
    fn on_idle(&mut self, _ctx: &mut dyn SimulationControl) {}

    /// Duration to wait after entering `UNDER_SERVICE` but before running
    /// the service procedure.
    fn preservice_delay(&mut self, _ctx: &mut dyn SimulationControl, _visit: &Visit) -> Duration {
        0.0
    }

    /// The ordered list of load/unload steps to perform for `visit`. The
    /// default is unload-first-then-load; a vehicle may override this
    /// entirely but the engine still drives each step's duration and
    /// bookkeeping.
    fn service_plan(&mut self, visit: &Visit) -> Vec<ServiceStep> {
        visit
            .delivery_list
            .iter()
            .cloned()
            .map(ServiceStep::Unload)
            .chain(visit.pickup_list.iter().cloned().map(ServiceStep::Load))
            .collect()
    }
}

/// A vehicle with no overrides at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultVehicleHooks;
impl VehicleHooks for DefaultVehicleHooks {}

/// Model-level mirrors of the vehicle hooks, plus `on_order_request`.
pub trait ModelHooks {
    fn on_order_request(&mut self, _ctx: &mut dyn SimulationControl, _order: &OrderId) {}
    fn on_vehicle_arrival(&mut self, _ctx: &mut dyn SimulationControl, _vehicle: &crate::model::VehicleId) {}
    fn on_vehicle_service_start(&mut self, _ctx: &mut dyn SimulationControl, _vehicle: &crate::model::VehicleId) {}
    fn on_vehicle_service_finish(&mut self, _ctx: &mut dyn SimulationControl, _vehicle: &crate::model::VehicleId) {}
    fn on_vehicle_idle(&mut self, _ctx: &mut dyn SimulationControl, _vehicle: &crate::model::VehicleId) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultModelHooks;
impl ModelHooks for DefaultModelHooks {}

/// The single opaque collaborator the engine talks to: it only ever
/// calls `route` with a snapshot and gets back a decision or an error
/// (which the coordinator wraps as `DecisionError::Callback`).
pub trait RoutingCallback {
    fn route(
        &mut self,
        state: &crate::decision::schema::StateSnapshot,
    ) -> anyhow::Result<crate::decision::schema::Decision>;
}
