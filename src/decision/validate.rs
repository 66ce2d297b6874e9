//! Decision validation. The coordinator rejects the whole decision on the
//! first violation found; nothing is ever partially applied.

use std::collections::HashSet;

use crate::error::DecisionError;
use crate::model::{LoadingRule, Model, OrderId, Visit, VehicleId};
use crate::time::SimTime;

use super::schema::{Decision, OrderDecision, OrderDisposition, VehicleDecision};

pub fn validate_decision(model: &Model, now: SimTime, decision: &Decision) -> Result<(), DecisionError> {
    validate_orders(model, now, decision)?;
    for (vehicle_id, entry) in &decision.vehicles {
        let Some(vehicle_decision) = entry else {
            continue;
        };
        let vehicle = model
            .vehicles
            .get(vehicle_id)
            .ok_or_else(|| DecisionError::UnknownVehicle(vehicle_id.clone()))?;

        validate_committed_visit(
            vehicle_id,
            vehicle,
            vehicle_decision.current_visit.as_ref(),
            &vehicle_decision.next_visits,
        )?;

        let visits: Vec<&Visit> = vehicle_decision
            .current_visit
            .iter()
            .chain(vehicle_decision.next_visits.iter())
            .collect();

        for visit in &visits {
            for order_id in visit.pickup_list.iter().chain(visit.delivery_list.iter()) {
                validate_order_not_canceled(model, vehicle_id, order_id)?;
            }
            for order_id in &visit.pickup_list {
                validate_order_accepted(model, decision, vehicle_id, order_id)?;
            }
        }

        validate_capacity_and_lifo(model, vehicle_id, &visits)?;
    }
    Ok(())
}

fn validate_orders(model: &Model, now: SimTime, decision: &Decision) -> Result<(), DecisionError> {
    for (order_id, order_decision) in &decision.orders {
        let order = model
            .orders
            .get(order_id)
            .ok_or_else(|| DecisionError::UnknownOrder(order_id.clone()))?;
        if !order.status.is_decidable() {
            return Err(DecisionError::OrderNotOpen(order_id.clone()));
        }
        if order_decision.status == OrderDisposition::Postponed {
            let until = order_decision.postponed_until.unwrap_or(now);
            if until <= now {
                return Err(DecisionError::PostponedNotInFuture(
                    order_id.clone(),
                    until,
                    now,
                ));
            }
        }
    }
    Ok(())
}

/// A vehicle's `current_visit` may only be rewritten while its service
/// has not yet started; once `service_start_time` is set, the
/// pickup/delivery lists (and hence the visit) are frozen, and if the
/// vehicle is `EN_ROUTE` the in-flight destination's location is frozen
/// the same way.
fn validate_committed_visit(
    vehicle_id: &VehicleId,
    vehicle: &crate::model::Vehicle,
    new_current: Option<&Visit>,
    new_next: &[Visit],
) -> Result<(), DecisionError> {
    use crate::model::VehicleStatus::*;
    match vehicle.status {
        UnderService => {
            let prior = vehicle.current_visit.as_ref();
            let unchanged = match (prior, new_current) {
                (Some(p), Some(n)) => {
                    p.location == n.location
                        && p.pickup_list == n.pickup_list
                        && p.delivery_list == n.delivery_list
                }
                _ => false,
            };
            if !unchanged {
                return Err(DecisionError::CommittedVisitRewritten(vehicle_id.clone()));
            }
        }
        EnRoute => {
            let in_flight = vehicle
                .next_visits
                .front()
                .map(|v| &v.location)
                .expect("EN_ROUTE vehicle always has a committed destination");
            // The committed destination is `next_visits[0]` in the model,
            // not `current_visit` (which is only set once arrived); a
            // decision for an EN_ROUTE vehicle conveys its intent through
            // `next_visits`, so `current_visit` must stay `None` here.
            if new_current.is_some() {
                return Err(DecisionError::CommittedVisitRewritten(vehicle_id.clone()));
            }
            let still_heading_there = new_next.first().map(|v| &v.location) == Some(in_flight);
            if !still_heading_there {
                return Err(DecisionError::EnRouteDestinationChanged(vehicle_id.clone()));
            }
        }
        WaitingForService | Idle => {}
    }
    Ok(())
}

fn validate_order_not_canceled(
    model: &Model,
    vehicle_id: &VehicleId,
    order_id: &OrderId,
) -> Result<(), DecisionError> {
    let canceled = model.canceled_orders.contains(order_id);
    let rejected = model
        .orders
        .get(order_id)
        .map(|o| o.status == crate::model::OrderStatus::Rejected)
        .unwrap_or(false);
    if canceled || rejected {
        return Err(DecisionError::CanceledOrderInVisit(
            vehicle_id.clone(),
            order_id.clone(),
        ));
    }
    Ok(())
}

fn validate_order_accepted(
    model: &Model,
    decision: &Decision,
    vehicle_id: &VehicleId,
    order_id: &OrderId,
) -> Result<(), DecisionError> {
    let accepted_this_cycle = decision
        .orders
        .get(order_id)
        .map(|od| od.status == OrderDisposition::Accepted)
        .unwrap_or(false);
    let already_routed = model.order_already_routed(order_id);
    if accepted_this_cycle || already_routed {
        Ok(())
    } else {
        Err(DecisionError::PickupOfUnacceptedOrder(
            vehicle_id.clone(),
            order_id.clone(),
        ))
    }
}

fn validate_capacity_and_lifo(
    model: &Model,
    vehicle_id: &VehicleId,
    visits: &[&Visit],
) -> Result<(), DecisionError> {
    let vehicle = model
        .vehicles
        .get(vehicle_id)
        .ok_or_else(|| DecisionError::UnknownVehicle(vehicle_id.clone()))?;

    let quantity_of = |id: &OrderId| -> i64 {
        model.orders.get(id).and_then(|o| o.quantity).unwrap_or(1)
    };

    let mut stack: Vec<OrderId> = vehicle.carrying_orders.clone();
    let mut total: i64 = stack.iter().map(|o| quantity_of(o)).sum();

    for visit in visits {
        match vehicle.loading_rule {
            LoadingRule::Lifo => {
                let n = visit.delivery_list.len();
                if n > 0 {
                    if stack.len() < n {
                        return Err(DecisionError::LifoViolation(vehicle_id.clone()));
                    }
                    let top: HashSet<&OrderId> = stack[stack.len() - n..].iter().collect();
                    let delivering: HashSet<&OrderId> = visit.delivery_list.iter().collect();
                    if top != delivering {
                        return Err(DecisionError::LifoViolation(vehicle_id.clone()));
                    }
                    stack.truncate(stack.len() - n);
                    for order_id in &visit.delivery_list {
                        total -= quantity_of(order_id);
                    }
                }
            }
            LoadingRule::Free => {
                let delivering: HashSet<&OrderId> = visit.delivery_list.iter().collect();
                if delivering.iter().any(|o| !stack.contains(o)) {
                    return Err(DecisionError::LifoViolation(vehicle_id.clone()));
                }
                stack.retain(|o| !delivering.contains(o));
                for order_id in &visit.delivery_list {
                    total -= quantity_of(order_id);
                }
            }
        }
        for order_id in &visit.pickup_list {
            stack.push(order_id.clone());
            total += quantity_of(order_id);
            if let Some(capacity) = vehicle.capacity {
                if total > capacity {
                    return Err(DecisionError::CapacityExceeded(vehicle_id.clone()));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, Order, Vehicle, Visit};

    fn capacity_model(capacity: i64) -> (Model, VehicleId) {
        let mut model = Model::new();
        model.add_location(Location::new("DEPOT")).unwrap();
        model
            .add_vehicle(Vehicle::new("TRUCK", "DEPOT").with_capacity(capacity))
            .unwrap();
        for id in ["A", "B"] {
            model
                .add_order(Order::new(id, "DEPOT", "DEPOT", 0.0).with_quantity(1))
                .unwrap();
            model.orders.get_mut(id).unwrap().status = crate::model::OrderStatus::Open;
        }
        (model, VehicleId::from("TRUCK"))
    }

    #[test]
    fn rejects_pickup_over_capacity() {
        let (model, vehicle_id) = capacity_model(1);
        let decision = Decision {
            vehicles: [(
                vehicle_id,
                Some(VehicleDecision {
                    current_visit: None,
                    next_visits: vec![Visit::new("DEPOT").with_pickup(["A".into(), "B".into()])],
                }),
            )]
            .into_iter()
            .collect(),
            orders: [
                ("A".into(), accept()),
                ("B".into(), accept()),
            ]
            .into_iter()
            .collect(),
        };
        let err = validate_decision(&model, SimTime::ZERO, &decision).unwrap_err();
        assert!(matches!(err, DecisionError::CapacityExceeded(_)));
    }

    #[test]
    fn allows_pickup_within_capacity() {
        let (model, vehicle_id) = capacity_model(2);
        let decision = Decision {
            vehicles: [(
                vehicle_id,
                Some(VehicleDecision {
                    current_visit: None,
                    next_visits: vec![Visit::new("DEPOT").with_pickup(["A".into(), "B".into()])],
                }),
            )]
            .into_iter()
            .collect(),
            orders: [
                ("A".into(), accept()),
                ("B".into(), accept()),
            ]
            .into_iter()
            .collect(),
        };
        validate_decision(&model, SimTime::ZERO, &decision).unwrap();
    }

    fn accept() -> OrderDecision {
        OrderDecision {
            status: OrderDisposition::Accepted,
            postponed_until: None,
        }
    }
}
