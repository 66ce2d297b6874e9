//! The decision coordinator: coalesces routing requests, quiesces, builds
//! the state snapshot, invokes the routing callback, validates, and
//! atomically applies the result.

use crate::error::{DecisionError, RuntimeWarning};
use crate::model::{OrderId, OrderStatus, VehicleId, VehicleStatus};

use super::schema::{Decision, OrderDisposition, OrderSnapshot, StateSnapshot, VehicleSnapshot};
use super::validate::validate_decision;
use crate::simulation::Simulation;

impl Simulation {
    /// Entry point for `SimAction::CoordinatorTick`. Clearing the flag
    /// before running the cycle, rather than after, is what lets a routing
    /// request raised *during* the callback or while applying the
    /// decision schedule a fresh tick instead of being silently swallowed.
    pub(crate) fn run_coordinator_cycle(&mut self) {
        self.coordinator_tick_scheduled = false;
        let time = self.clock();

        let Some(mut callback) = self.routing_callback.take() else {
            self.warn(RuntimeWarning::NoRoutingCallback);
            self.auto_reject_open_orders();
            return;
        };

        let snapshot = self.build_snapshot();
        tracing::info!(%time, open_orders = snapshot.open_orders.len(), "coordinator cycle start");
        let result = callback.route(&snapshot);
        self.routing_callback = Some(callback);

        let decision = match result {
            Ok(d) => d,
            Err(e) => {
                let wrapped = DecisionError::Callback(e);
                tracing::warn!(error = %wrapped, "routing callback failed, decision discarded");
                return;
            }
        };

        if decision.is_noop() {
            tracing::info!(%time, vehicles_touched = 0, "coordinator cycle end");
            return;
        }

        if let Err(e) = validate_decision(&self.model, self.clock(), &decision) {
            tracing::warn!(error = %e, "decision rejected by validation, discarded");
            return;
        }

        self.warn_undecided_open_orders(&snapshot, &decision);
        let vehicles_touched = decision.vehicles.len();
        self.apply_decision(decision);
        tracing::info!(%time, vehicles_touched, "coordinator cycle end");
    }

    /// A non-noop decision is free to leave some OPEN orders untouched;
    /// that's not an error, but it's worth surfacing.
    fn warn_undecided_open_orders(&mut self, snapshot: &StateSnapshot, decision: &Decision) {
        let undecided: Vec<OrderId> = snapshot
            .open_orders
            .values()
            .filter(|o| o.status == OrderStatus::Open)
            .map(|o| o.id.clone())
            .filter(|id| !decision.orders.contains_key(id))
            .collect();
        for id in undecided {
            self.warn(RuntimeWarning::OpenOrderWithoutDecision(id));
        }
    }

    fn build_snapshot(&self) -> StateSnapshot {
        let vehicles = self
            .model
            .vehicles
            .iter()
            .map(|(id, v)| {
                (
                    id.clone(),
                    VehicleSnapshot {
                        status: v.status,
                        previous_visit: v.previous_visit.clone(),
                        current_visit: v.current_visit.clone(),
                        next_visits: v.next_visits.iter().cloned().collect(),
                        carrying_orders: v.carrying_orders.clone(),
                    },
                )
            })
            .collect();

        let open_orders = self
            .model
            .orders
            .iter()
            .filter(|(_, o)| o.status.is_open_ish())
            .map(|(id, o)| {
                (
                    id.clone(),
                    OrderSnapshot {
                        id: id.clone(),
                        pickup_location: o.pickup_location.clone(),
                        delivery_location: o.delivery_location.clone(),
                        release_date: o.release_date,
                        due_date: o.due_date,
                        earliest_service_start_pickup: o.earliest_service_start_pickup,
                        latest_service_start_pickup: o.latest_service_start_pickup,
                        earliest_service_start_delivery: o.earliest_service_start_delivery,
                        latest_service_start_delivery: o.latest_service_start_delivery,
                        quantity: o.quantity,
                        assigned_vehicle: o.assigned_vehicle.clone(),
                        pickup_time: o.pickup_time,
                        pickup_vehicle: o.assigned_vehicle.clone(),
                        status: o.status,
                    },
                )
            })
            .collect();

        StateSnapshot {
            time: self.clock(),
            vehicles,
            open_orders,
            canceled_orders: self.model.canceled_orders.clone(),
            aux: self.model.aux.clone(),
        }
    }

    fn auto_reject_open_orders(&mut self) {
        let ids: Vec<OrderId> = self
            .model
            .orders
            .iter()
            .filter(|(_, o)| o.status.is_decidable())
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            self.model.orders.gets_mut(&id).status = OrderStatus::Rejected;
        }
    }

    fn apply_decision(&mut self, decision: Decision) {
        for (order_id, od) in &decision.orders {
            let order = self.model.orders.gets_mut(order_id);
            match od.status {
                OrderDisposition::Accepted => {}
                OrderDisposition::Rejected => order.status = OrderStatus::Rejected,
                OrderDisposition::Postponed => {
                    order.status = OrderStatus::Postponed;
                    order.postponed_until = od.postponed_until;
                    if let Some(until) = od.postponed_until {
                        self.schedule(until, crate::engine::SimAction::PostponementExpiry { order: order_id.clone() });
                    }
                }
            }
        }

        let touched: Vec<VehicleId> = decision.vehicles.keys().cloned().collect();
        for (vehicle_id, entry) in decision.vehicles {
            let Some(vd) = entry else { continue };
            let vehicle = self.model.vehicles.gets_mut(&vehicle_id);
            let interruptible = vehicle.status == VehicleStatus::WaitingForService;
            if let Some(cv) = vd.current_visit {
                vehicle.current_visit = Some(cv);
            }
            vehicle.next_visits = vd.next_visits.into();
            if interruptible {
                self.interrupt_and_reevaluate(&vehicle_id);
            }
        }
        for vehicle_id in &touched {
            self.kick_if_idle(vehicle_id);
        }
    }
}
