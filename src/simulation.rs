//! `Simulation`: owns the model, the event queue, the simulated clock, and
//! every piece of per-vehicle/per-cycle bookkeeping the rest of the crate
//! mutates.

use crate::callbacks::{
    DefaultModelHooks, DefaultVehicleHooks, ModelHooks, RoutingCallback, SimulationControl, VehicleHooks,
};
use crate::config::SimulationConfig;
use crate::engine::event_queue::EventQueue;
use crate::engine::SimAction;
use crate::error::{RuntimeWarning, SetupError};
use crate::model::{MapType, Model, OrderId, OrderStatus, VehicleId};
use crate::provider::PeriodicUpdater;
use crate::time::SimTime;
use crate::vehicle_exec::VehicleExec;

pub struct Simulation {
    pub model: Model,
    config: SimulationConfig,
    clock: SimTime,
    queue: EventQueue<SimAction>,

    vehicle_hooks: MapType<VehicleId, Box<dyn VehicleHooks>>,
    model_hooks: Option<Box<dyn ModelHooks>>,
    pub(crate) routing_callback: Option<Box<dyn RoutingCallback>>,

    pub(crate) vehicle_state: MapType<VehicleId, VehicleExec>,
    pub(crate) coordinator_tick_scheduled: bool,
    pub(crate) periodic: Option<PeriodicUpdater>,

    warnings: Vec<RuntimeWarning>,
}

impl Simulation {
    pub fn new(model: Model, config: SimulationConfig) -> Result<Self, SetupError> {
        model.validate()?;
        config.validate()?;
        let clock = config.start_time;
        let vehicle_state = model
            .vehicles
            .keys()
            .cloned()
            .map(|id| (id, VehicleExec::new()))
            .collect();
        Ok(Self {
            model,
            config,
            clock,
            queue: EventQueue::new(),
            vehicle_hooks: MapType::new(),
            model_hooks: Some(Box::new(DefaultModelHooks)),
            routing_callback: None,
            vehicle_state,
            coordinator_tick_scheduled: false,
            periodic: None,
            warnings: Vec::new(),
        })
    }

    pub fn set_vehicle_hooks(&mut self, vehicle: VehicleId, hooks: Box<dyn VehicleHooks>) {
        self.vehicle_hooks.insert(vehicle, hooks);
    }

    pub fn set_model_hooks(&mut self, hooks: Box<dyn ModelHooks>) {
        self.model_hooks = Some(hooks);
    }

    pub fn set_routing_callback(&mut self, callback: Box<dyn RoutingCallback>) {
        self.routing_callback = Some(callback);
    }

    pub fn now(&self) -> SimTime {
        self.clock
    }

    pub(crate) fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn warnings(&self) -> &[RuntimeWarning] {
        &self.warnings
    }

    pub(crate) fn schedule(&mut self, at: SimTime, action: SimAction) {
        self.queue.push(at, action);
    }

    pub(crate) fn warn(&mut self, warning: RuntimeWarning) {
        tracing::warn!(%warning);
        self.warnings.push(warning);
    }

    /// Temporarily removes a vehicle's hooks from the map so `f` can take
    /// `&mut self` (as the `SimulationControl` it needs) without aliasing
    /// the box it's calling through.
    pub(crate) fn call_vehicle_hook<R>(
        &mut self,
        vehicle_id: &VehicleId,
        f: impl FnOnce(&mut dyn VehicleHooks, &mut dyn SimulationControl) -> R,
    ) -> R {
        let mut hooks = self
            .vehicle_hooks
            .remove(vehicle_id)
            .unwrap_or_else(|| Box::new(DefaultVehicleHooks));
        let result = f(hooks.as_mut(), self);
        self.vehicle_hooks.insert(vehicle_id.clone(), hooks);
        result
    }

    pub(crate) fn call_model_hook<R>(
        &mut self,
        f: impl FnOnce(&mut dyn ModelHooks, &mut dyn SimulationControl) -> R,
    ) -> R {
        let mut hooks = self.model_hooks.take().unwrap_or_else(|| Box::new(DefaultModelHooks));
        let result = f(hooks.as_mut(), self);
        self.model_hooks = Some(hooks);
        result
    }

    /// Raises a routing request, coalescing with any already pending in
    /// this quiescence window. The one piece of public API
    /// hooks reach through `SimulationControl` for.
    pub fn request_for_routing(&mut self) {
        if self.coordinator_tick_scheduled {
            return;
        }
        self.coordinator_tick_scheduled = true;
        let at = self.clock + self.config.quiescence_epsilon;
        self.schedule(at, SimAction::CoordinatorTick);
    }

    /// Runs the event loop to completion: no runnable process and no
    /// future event remain, or `stop_at` has been reached.
    pub fn run(&mut self) {
        self.seed_order_provider();
        loop {
            let Some((time, _seq, action)) = self.queue.pop() else {
                break;
            };
            if let Some(stop_at) = self.config.stop_at {
                if time > stop_at {
                    break;
                }
            }
            self.clock = time;
            self.dispatch(action);
        }
        self.warn_on_unfinished_orders();
    }

    fn dispatch(&mut self, action: SimAction) {
        tracing::debug!(time = %self.clock, event = ?action, "dispatching event");
        match action {
            SimAction::VehicleStep { vehicle, epoch } => self.vehicle_step(vehicle, epoch),
            SimAction::OrderRelease { order } => {
                let raise_routing = self.config.decision_on_order_request;
                self.request_order(order, raise_routing);
            }
            SimAction::PostponementExpiry { order } => self.reopen_postponed(order),
            SimAction::PeriodicTick => self.periodic_tick(),
            SimAction::CoordinatorTick => self.run_coordinator_cycle(),
        }
    }

    fn warn_on_unfinished_orders(&mut self) {
        let unfinished: Vec<OrderId> = self
            .model
            .orders
            .values()
            .filter(|o| {
                matches!(
                    o.status,
                    OrderStatus::Open | OrderStatus::Postponed | OrderStatus::PickedUp
                )
            })
            .map(|o| o.id.clone())
            .collect();
        for id in unfinished {
            self.warn(RuntimeWarning::OrderNotDeliveredByHorizon(id));
        }
    }
}

impl SimulationControl for Simulation {
    fn now(&self) -> SimTime {
        self.clock
    }

    fn request_for_routing(&mut self) {
        Simulation::request_for_routing(self);
    }
}
