//! The per-vehicle execution state machine: an explicit `VehiclePhase`
//! persisted in `VehicleExec` and resumed by dispatching
//! `SimAction::VehicleStep`, rather than a suspended generator frame.
//!
//! Every phase transition that doesn't wait on a real duration still goes
//! through the event queue with a zero-delay `VehicleStep`, so same-instant
//! ordering across vehicles stays governed by the queue's FIFO tiebreak
//! rather than by call-stack recursion.

use std::collections::VecDeque;

use crate::callbacks::{ServiceStep, SimulationControl};
use crate::engine::resource::ResourceId;
use crate::engine::SimAction;
use crate::model::{OrderStatus, Visit, VehicleId, VehicleStatus};
use crate::simulation::Simulation;
use crate::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum VehiclePhase {
    /// At rest; `next_visits` is empty and nothing is scheduled. Only an
    /// external wake-up (a decision populating `next_visits`) moves it on.
    Idle,
    /// Departed toward `next_visits[0]`, waiting out travel time.
    Traveling,
    /// Arrived, waiting on the location's docking resource. Only an
    /// explicit grant (via `ResourceTable::release`) moves it on; no timer
    /// is scheduled for this phase.
    RequestingResource,
    /// Resource (if any) held; waiting for the visit's `earliest_start_time`.
    AwaitingEarliestStart,
    /// About to call `preservice_delay`.
    ComputingPreService,
    /// `preservice_delay` returned a positive wait, now elapsed.
    PreServiceDelayElapsed,
    /// Running the ordered load/unload steps of `service_plan`.
    Servicing(VecDeque<ServiceStep>),
}

pub(crate) struct VehicleExec {
    pub phase: VehiclePhase,
    /// Bumped on every interruption; a `VehicleStep` fires only if its
    /// captured epoch still matches.
    pub interrupt_epoch: u64,
    pub held_resource: Option<ResourceId>,
}

impl VehicleExec {
    pub(crate) fn new() -> Self {
        Self {
            phase: VehiclePhase::Idle,
            interrupt_epoch: 0,
            held_resource: None,
        }
    }
}

impl Simulation {
    pub(crate) fn vehicle_step(&mut self, vehicle_id: VehicleId, epoch: u64) {
        let Some(exec) = self.vehicle_state.get(&vehicle_id) else {
            return;
        };
        if exec.interrupt_epoch != epoch {
            return;
        }
        match exec.phase.clone() {
            VehiclePhase::Traveling => self.handle_arrival(&vehicle_id),
            VehiclePhase::RequestingResource => {}
            VehiclePhase::AwaitingEarliestStart => self.handle_awaiting_earliest_start(&vehicle_id),
            VehiclePhase::ComputingPreService => self.handle_compute_preservice(&vehicle_id),
            VehiclePhase::PreServiceDelayElapsed => self.begin_service(&vehicle_id),
            VehiclePhase::Servicing(remaining) => self.handle_service_step(&vehicle_id, remaining),
            VehiclePhase::Idle => {}
        }
    }

    pub(crate) fn set_phase(&mut self, vehicle_id: &VehicleId, phase: VehiclePhase) {
        self.vehicle_state
            .entry(vehicle_id.clone())
            .or_insert_with(VehicleExec::new)
            .phase = phase;
    }

    fn schedule_vehicle_wakeup(&mut self, vehicle_id: &VehicleId, delay: Duration) {
        let epoch = self
            .vehicle_state
            .entry(vehicle_id.clone())
            .or_insert_with(VehicleExec::new)
            .interrupt_epoch;
        let at = self.clock() + delay.max(0.0);
        self.schedule(
            at,
            SimAction::VehicleStep {
                vehicle: vehicle_id.clone(),
                epoch,
            },
        );
    }

    /// Interrupts a pending wait so it's re-evaluated against freshly
    /// applied route data, rather than resuming with stale assumptions.
    /// Non-interruptible phases (traveling, servicing, waiting on the
    /// resource queue) are left alone: their underlying data cannot
    /// change mid-flight by construction (`validate_committed_visit`
    /// forbids it).
    pub(crate) fn interrupt_and_reevaluate(&mut self, vehicle_id: &VehicleId) {
        let exec = self
            .vehicle_state
            .entry(vehicle_id.clone())
            .or_insert_with(VehicleExec::new);
        exec.interrupt_epoch += 1;
        match exec.phase {
            VehiclePhase::AwaitingEarliestStart => {
                self.schedule_vehicle_wakeup(vehicle_id, 0.0);
            }
            _ => {}
        }
    }

    /// Pops `next_visits[0]` as the committed destination and starts
    /// traveling toward it, or transitions to `IDLE` if there is none.
    pub(crate) fn begin_travel_or_idle(&mut self, vehicle_id: &VehicleId) {
        let vehicle = self.model.vehicles.gets(vehicle_id);
        if vehicle.next_visits.is_empty() {
            self.enter_idle(vehicle_id);
            return;
        }
        let destination = vehicle.next_visits.front().unwrap().location.clone();
        let origin = vehicle.position().clone();
        let travel = self.call_vehicle_hook(vehicle_id, |h, _ctx| h.travel_time(&origin, &destination));

        let now = self.clock();
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        vehicle.previous_visit = vehicle.current_visit.take().map(|mut v| {
            v.departure_time = Some(now);
            v
        });
        vehicle.status = VehicleStatus::EnRoute;
        self.set_phase(vehicle_id, VehiclePhase::Traveling);
        tracing::debug!(vehicle = %vehicle_id, %destination, travel, "en_route");
        self.schedule_vehicle_wakeup(vehicle_id, travel);
    }

    fn enter_idle(&mut self, vehicle_id: &VehicleId) {
        let now = self.clock();
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        let location = vehicle.position().clone();
        vehicle.previous_visit = vehicle.current_visit.take().map(|mut v| {
            v.departure_time = Some(now);
            v
        });
        vehicle.status = VehicleStatus::Idle;
        let mut stop = Visit::new(location);
        stop.arrival_time = Some(now);
        vehicle.current_visit = Some(stop);
        self.set_phase(vehicle_id, VehiclePhase::Idle);
        tracing::debug!(vehicle = %vehicle_id, "idle");

        self.call_vehicle_hook(vehicle_id, |h, ctx| h.on_idle(ctx));
        self.call_model_hook(|h, ctx| h.on_vehicle_idle(ctx, vehicle_id));
    }

    /// Whenever a decision hands a previously idle vehicle a fresh route,
    /// the vehicle departs immediately rather than waiting for a
    /// wake-up that was never scheduled.
    pub(crate) fn kick_if_idle(&mut self, vehicle_id: &VehicleId) {
        let vehicle = self.model.vehicles.gets(vehicle_id);
        if vehicle.status == VehicleStatus::Idle && !vehicle.next_visits.is_empty() {
            self.begin_travel_or_idle(vehicle_id);
        }
    }

    fn handle_arrival(&mut self, vehicle_id: &VehicleId) {
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        let mut visit = vehicle
            .next_visits
            .pop_front()
            .expect("EN_ROUTE vehicle always has a committed destination");
        visit.arrival_time = Some(self.clock());
        let resource = self.model.locations.get(&visit.location).and_then(|l| l.resource);

        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        vehicle.current_visit = Some(visit);
        vehicle.status = VehicleStatus::WaitingForService;
        tracing::debug!(vehicle = %vehicle_id, "arrived");
        tracing::debug!(vehicle = %vehicle_id, "waiting_for_service");

        self.call_vehicle_hook(vehicle_id, |h, ctx| h.on_arrival(ctx));
        self.call_model_hook(|h, ctx| h.on_vehicle_arrival(ctx, vehicle_id));

        match resource {
            Some(res_id) => {
                self.vehicle_state
                    .entry(vehicle_id.clone())
                    .or_insert_with(VehicleExec::new)
                    .held_resource = Some(res_id);
                if self.model.resources.try_acquire(res_id, vehicle_id.clone()) {
                    self.set_phase(vehicle_id, VehiclePhase::AwaitingEarliestStart);
                    self.schedule_vehicle_wakeup(vehicle_id, 0.0);
                } else {
                    self.set_phase(vehicle_id, VehiclePhase::RequestingResource);
                }
            }
            None => {
                self.set_phase(vehicle_id, VehiclePhase::AwaitingEarliestStart);
                self.schedule_vehicle_wakeup(vehicle_id, 0.0);
            }
        }
    }

    /// Called when `ResourceTable::release` hands this vehicle's pending
    /// request the freed slot.
    pub(crate) fn grant_resource(&mut self, vehicle_id: &VehicleId) {
        self.set_phase(vehicle_id, VehiclePhase::AwaitingEarliestStart);
        self.schedule_vehicle_wakeup(vehicle_id, 0.0);
    }

    fn handle_awaiting_earliest_start(&mut self, vehicle_id: &VehicleId) {
        let vehicle = self.model.vehicles.gets(vehicle_id);
        let visit = vehicle
            .current_visit
            .as_ref()
            .expect("WAITING_FOR_SERVICE vehicle has a current visit");
        if let Some(earliest) = visit.earliest_start_time {
            if earliest > self.clock() {
                tracing::info!(vehicle = %vehicle_id, %earliest, now = %self.clock(), "waiting for earliest start");
                self.set_phase(vehicle_id, VehiclePhase::AwaitingEarliestStart);
                self.schedule_vehicle_wakeup(vehicle_id, earliest - self.clock());
                return;
            }
        }
        self.set_phase(vehicle_id, VehiclePhase::ComputingPreService);
        self.schedule_vehicle_wakeup(vehicle_id, 0.0);
    }

    fn handle_compute_preservice(&mut self, vehicle_id: &VehicleId) {
        let now = self.clock();
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        vehicle.status = VehicleStatus::UnderService;
        if let Some(v) = vehicle.current_visit.as_mut() {
            v.service_start_time = Some(now);
        }
        tracing::debug!(vehicle = %vehicle_id, "under_service");
        self.call_vehicle_hook(vehicle_id, |h, ctx| h.on_service_start(ctx));
        self.call_model_hook(|h, ctx| h.on_vehicle_service_start(ctx, vehicle_id));

        let visit = self
            .model
            .vehicles
            .gets(vehicle_id)
            .current_visit
            .clone()
            .expect("UNDER_SERVICE vehicle has a current visit");
        let delay = self.call_vehicle_hook(vehicle_id, |h, ctx| h.preservice_delay(ctx, &visit));
        if delay > 0.0 {
            self.set_phase(vehicle_id, VehiclePhase::PreServiceDelayElapsed);
            self.schedule_vehicle_wakeup(vehicle_id, delay);
        } else {
            self.begin_service(vehicle_id);
        }
    }

    fn begin_service(&mut self, vehicle_id: &VehicleId) {
        let visit = self
            .model
            .vehicles
            .gets(vehicle_id)
            .current_visit
            .clone()
            .expect("UNDER_SERVICE vehicle has a current visit");
        let plan: VecDeque<ServiceStep> =
            self.call_vehicle_hook(vehicle_id, |h, _ctx| h.service_plan(&visit)).into();

        if plan.is_empty() {
            self.finish_service(vehicle_id);
        } else {
            self.set_phase(vehicle_id, VehiclePhase::Servicing(plan));
            self.schedule_vehicle_wakeup(vehicle_id, 0.0);
        }
    }

    fn handle_service_step(&mut self, vehicle_id: &VehicleId, mut remaining: VecDeque<ServiceStep>) {
        let Some(step) = remaining.pop_front() else {
            self.finish_service(vehicle_id);
            return;
        };
        let duration = self.step_duration(&step);
        match &step {
            ServiceStep::Unload(order_id) => self.apply_unload(vehicle_id, order_id),
            ServiceStep::Load(order_id) => self.apply_load(vehicle_id, order_id),
        }
        self.set_phase(vehicle_id, VehiclePhase::Servicing(remaining));
        self.schedule_vehicle_wakeup(vehicle_id, duration);
    }

    fn step_duration(&self, step: &ServiceStep) -> Duration {
        match step {
            ServiceStep::Unload(id) => self.model.orders.get(id).map(|o| o.delivery_duration).unwrap_or(0.0),
            ServiceStep::Load(id) => self.model.orders.get(id).map(|o| o.pickup_duration).unwrap_or(0.0),
        }
    }

    fn apply_unload(&mut self, vehicle_id: &VehicleId, order_id: &crate::model::OrderId) {
        if self
            .model
            .orders
            .get(order_id)
            .map(|o| o.status == OrderStatus::Canceled)
            .unwrap_or(true)
        {
            self.warn(crate::error::RuntimeWarning::CanceledOrderSkipped(
                vehicle_id.clone(),
                order_id.clone(),
            ));
            self.model.vehicles.gets_mut(vehicle_id).carrying_orders.retain(|o| o != order_id);
            return;
        }
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        vehicle.carrying_orders.retain(|o| o != order_id);
        let now = self.clock();
        let order = self.model.orders.gets_mut(order_id);
        order.status = OrderStatus::Delivered;
        order.delivery_time = Some(now);
    }

    fn apply_load(&mut self, vehicle_id: &VehicleId, order_id: &crate::model::OrderId) {
        if self
            .model
            .orders
            .get(order_id)
            .map(|o| o.status == OrderStatus::Canceled)
            .unwrap_or(true)
        {
            self.warn(crate::error::RuntimeWarning::CanceledOrderSkipped(
                vehicle_id.clone(),
                order_id.clone(),
            ));
            return;
        }
        self.model.vehicles.gets_mut(vehicle_id).carrying_orders.push(order_id.clone());
        let now = self.clock();
        let vehicle_id_clone = vehicle_id.clone();
        let order = self.model.orders.gets_mut(order_id);
        order.status = OrderStatus::PickedUp;
        order.pickup_time = Some(now);
        order.assigned_vehicle = Some(vehicle_id_clone);
    }

    fn finish_service(&mut self, vehicle_id: &VehicleId) {
        let now = self.clock();
        let vehicle = self.model.vehicles.gets_mut(vehicle_id);
        if let Some(v) = vehicle.current_visit.as_mut() {
            v.service_finish_time = Some(now);
            v.departure_time = Some(now);
        }
        self.call_vehicle_hook(vehicle_id, |h, ctx| h.on_service_finish(ctx));
        self.call_model_hook(|h, ctx| h.on_vehicle_service_finish(ctx, vehicle_id));

        if let Some(res_id) = self
            .vehicle_state
            .get_mut(vehicle_id)
            .and_then(|exec| exec.held_resource.take())
        {
            if let Some(granted) = self.model.resources.release(res_id) {
                self.grant_resource(&granted);
            }
        }
        self.begin_travel_or_idle(vehicle_id);
    }
}
