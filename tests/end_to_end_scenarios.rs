//! End-to-end scenarios.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use dvrpsim::callbacks::{RoutingCallback, VehicleHooks};
use dvrpsim::decision::{Decision, OrderDecision, OrderDisposition, StateSnapshot, VehicleDecision};
use dvrpsim::model::{Location, LocationId, Order, OrderStatus, Vehicle, VehicleStatus, Visit};
use dvrpsim::time::Duration;
use dvrpsim::{Model, Simulation, SimulationConfig};

/// A routing callback driven by a queue of canned decisions, one per
/// invocation; falls back to a no-op once the queue is drained. Records
/// the simulated time of each invocation in `calls` so a test can inspect
/// it after `Simulation::run` has consumed the callback.
struct ScriptedCallback {
    decisions: VecDeque<Decision>,
    calls: Rc<RefCell<Vec<f64>>>,
}

impl ScriptedCallback {
    fn new(decisions: Vec<Decision>, calls: Rc<RefCell<Vec<f64>>>) -> Self {
        Self {
            decisions: decisions.into(),
            calls,
        }
    }
}

impl RoutingCallback for ScriptedCallback {
    fn route(&mut self, state: &StateSnapshot) -> anyhow::Result<Decision> {
        self.calls.borrow_mut().push(state.time.as_f64());
        Ok(self.decisions.pop_front().unwrap_or_default())
    }
}

/// Travel takes a fixed duration between distinct locations and nothing
/// between a location and itself (a same-spot "stop" never travels).
struct ConstantTravel(Duration);

impl VehicleHooks for ConstantTravel {
    fn travel_time(&mut self, origin: &LocationId, destination: &LocationId) -> Duration {
        if origin == destination {
            0.0
        } else {
            self.0
        }
    }
}

fn two_location_model(release_date: f64) -> (Model, LocationId, LocationId) {
    let depot = LocationId::from("DEPOT");
    let customer = LocationId::from("CUSTOMER");
    let mut model = Model::new();
    model.add_location(Location::new(depot.clone())).unwrap();
    model.add_location(Location::new(customer.clone())).unwrap();
    model
        .add_vehicle(Vehicle::new("TRUCK", depot.clone()))
        .unwrap();
    model
        .add_order(
            Order::new("O-1", depot.clone(), customer.clone(), release_date)
                .with_durations(0.0, 0.0),
        )
        .unwrap();
    (model, depot, customer)
}

#[test]
fn reject_all_default() {
    let (model, depot, _customer) = two_location_model(8.0);
    let mut sim = Simulation::new(model, SimulationConfig::default()).unwrap();
    sim.run();

    let order = sim.model.orders.get("O-1").unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);

    let vehicle = sim.model.vehicles.get("TRUCK").unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Idle);
    assert_eq!(vehicle.position(), &depot);
}

#[test]
fn single_trip() {
    let (model, depot, customer) = two_location_model(8.0);

    let assign = Decision {
        vehicles: [(
            "TRUCK".into(),
            Some(VehicleDecision {
                current_visit: None,
                next_visits: vec![
                    Visit::new(depot.clone()).with_pickup(["O-1".into()]),
                    Visit::new(customer.clone()).with_delivery(["O-1".into()]),
                    Visit::new(depot.clone()),
                ],
            }),
        )]
        .into_iter()
        .collect(),
        orders: [(
            "O-1".into(),
            OrderDecision {
                status: OrderDisposition::Accepted,
                postponed_until: None,
            },
        )]
        .into_iter()
        .collect(),
    };

    let mut sim = Simulation::new(model, SimulationConfig::default()).unwrap();
    sim.set_vehicle_hooks("TRUCK".into(), Box::new(ConstantTravel(5.0)));
    sim.set_routing_callback(Box::new(ScriptedCallback::new(vec![assign], Rc::new(RefCell::new(Vec::new())))));
    sim.run();

    let order = sim.model.orders.get("O-1").unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!((order.pickup_time.unwrap().as_f64() - 8.0).abs() < 1e-6);
    assert!((order.delivery_time.unwrap().as_f64() - 13.0).abs() < 1e-6);

    let vehicle = sim.model.vehicles.get("TRUCK").unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Idle);
    assert_eq!(vehicle.position(), &depot);
}

#[test]
fn earliest_start_enforced() {
    let (model, depot, customer) = two_location_model(8.0);

    let assign = Decision {
        vehicles: [(
            "TRUCK".into(),
            Some(VehicleDecision {
                current_visit: None,
                next_visits: vec![
                    Visit::new(depot.clone()).with_pickup(["O-1".into()]),
                    Visit::new(customer.clone())
                        .with_delivery(["O-1".into()])
                        .with_earliest_start_time(23.0),
                ],
            }),
        )]
        .into_iter()
        .collect(),
        orders: [(
            "O-1".into(),
            OrderDecision {
                status: OrderDisposition::Accepted,
                postponed_until: None,
            },
        )]
        .into_iter()
        .collect(),
    };

    let mut sim = Simulation::new(model, SimulationConfig::default()).unwrap();
    sim.set_vehicle_hooks("TRUCK".into(), Box::new(ConstantTravel(12.0)));
    sim.set_routing_callback(Box::new(ScriptedCallback::new(vec![assign], Rc::new(RefCell::new(Vec::new())))));
    sim.run();

    let vehicle = sim.model.vehicles.get("TRUCK").unwrap();
    let served = vehicle.previous_visit.as_ref().expect("delivery visit retained as previous_visit");
    assert_eq!(served.location, customer);
    assert!((served.arrival_time.unwrap().as_f64() - 20.0).abs() < 1e-6);
    assert!((served.service_start_time.unwrap().as_f64() - 23.0).abs() < 1e-6);
}

#[test]
fn docking_capacity_fifo() {
    let dock = LocationId::from("DOCK");
    let mut model = Model::new();
    let resource = model.create_resource(1).unwrap();
    model
        .add_location(Location::new(dock.clone()).with_resource(resource))
        .unwrap();
    model.add_vehicle(Vehicle::new("V1", dock.clone())).unwrap();
    model.add_vehicle(Vehicle::new("V2", dock.clone())).unwrap();
    model
        .add_order(Order::new("O-1", dock.clone(), dock.clone(), 0.0).with_durations(2.0, 0.0))
        .unwrap();
    model
        .add_order(Order::new("O-2", dock.clone(), dock.clone(), 0.0).with_durations(2.0, 0.0))
        .unwrap();

    let assign = Decision {
        vehicles: [
            (
                "V1".into(),
                Some(VehicleDecision {
                    current_visit: None,
                    next_visits: vec![Visit::new(dock.clone()).with_pickup(["O-1".into()])],
                }),
            ),
            (
                "V2".into(),
                Some(VehicleDecision {
                    current_visit: None,
                    next_visits: vec![Visit::new(dock.clone()).with_pickup(["O-2".into()])],
                }),
            ),
        ]
        .into_iter()
        .collect(),
        orders: [
            (
                "O-1".into(),
                OrderDecision {
                    status: OrderDisposition::Accepted,
                    postponed_until: None,
                },
            ),
            (
                "O-2".into(),
                OrderDecision {
                    status: OrderDisposition::Accepted,
                    postponed_until: None,
                },
            ),
        ]
        .into_iter()
        .collect(),
    };

    let mut sim = Simulation::new(model, SimulationConfig::default()).unwrap();
    sim.set_routing_callback(Box::new(ScriptedCallback::new(vec![assign], Rc::new(RefCell::new(Vec::new())))));
    sim.run();

    let v1 = sim.model.vehicles.get("V1").unwrap();
    let v2 = sim.model.vehicles.get("V2").unwrap();
    let v1_visit = v1.previous_visit.as_ref().expect("V1 served its stop");
    let v2_visit = v2.previous_visit.as_ref().expect("V2 served its stop");

    assert!((v1_visit.service_start_time.unwrap().as_f64() - 0.0).abs() < 1e-6);
    assert!((v1_visit.service_finish_time.unwrap().as_f64() - 2.0).abs() < 1e-6);
    assert!((v2_visit.service_start_time.unwrap().as_f64() - 2.0).abs() < 1e-6);
}

#[test]
fn postponement_reopens_routing_without_external_trigger() {
    let (model, depot, _customer) = two_location_model(0.0);

    let postpone = Decision {
        vehicles: Default::default(),
        orders: [(
            "O-1".into(),
            OrderDecision {
                status: OrderDisposition::Postponed,
                postponed_until: Some(18.0.into()),
            },
        )]
        .into_iter()
        .collect(),
    };
    let reject = Decision {
        vehicles: Default::default(),
        orders: [(
            "O-1".into(),
            OrderDecision {
                status: OrderDisposition::Rejected,
                postponed_until: None,
            },
        )]
        .into_iter()
        .collect(),
    };

    let calls = Rc::new(RefCell::new(Vec::new()));
    let callback = ScriptedCallback::new(vec![postpone, reject], Rc::clone(&calls));
    let mut sim = Simulation::new(model, SimulationConfig::default()).unwrap();
    sim.set_routing_callback(Box::new(callback));
    sim.run();

    let order = sim.model.orders.get("O-1").unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);

    let calls = calls.borrow();
    assert_eq!(calls.len(), 2, "postponement must trigger a second cycle on its own");
    assert!((calls[1] - 18.0).abs() < 1e-6, "second cycle should fire at postponed_until");
    let _ = depot;
}

#[test]
fn lifo_violation_rejected() {
    use dvrpsim::decision::validate::validate_decision;
    use dvrpsim::model::LoadingRule;

    let depot = LocationId::from("DEPOT");
    let mut model = Model::new();
    model.add_location(Location::new(depot.clone())).unwrap();
    let mut vehicle = Vehicle::new("TRUCK", depot.clone()).with_loading_rule(LoadingRule::Lifo);
    vehicle.carrying_orders = vec!["A".into(), "B".into()];
    model.add_vehicle(vehicle).unwrap();
    model
        .add_order(Order::new("A", depot.clone(), depot.clone(), 0.0))
        .unwrap();
    model
        .add_order(Order::new("B", depot.clone(), depot.clone(), 0.0))
        .unwrap();
    for id in ["A", "B"] {
        model.orders.get_mut(id).unwrap().status = OrderStatus::PickedUp;
    }

    let bad_decision = Decision {
        vehicles: [(
            "TRUCK".into(),
            Some(VehicleDecision {
                current_visit: Some(Visit::new(depot.clone()).with_delivery(["A".into()])),
                next_visits: vec![],
            }),
        )]
        .into_iter()
        .collect(),
        orders: Default::default(),
    };

    let err = validate_decision(&model, 0.0.into(), &bad_decision).unwrap_err();
    assert!(matches!(err, dvrpsim::error::DecisionError::LifoViolation(_)));
}
