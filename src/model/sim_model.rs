//! `Model`: the container owning locations, vehicles, and orders. A
//! `Model` has no ambient global state of its own; multiple models may
//! exist side by side without interference.

use serde_json::Value;

use super::{Location, LocationId, MapType, Order, OrderId, Vehicle, VehicleId};
use crate::engine::resource::{ResourceId, ResourceTable};
use crate::error::{ConfigError, ModelError, SetupError};
use crate::time::SimTime;

#[derive(Default)]
pub struct Model {
    pub locations: MapType<LocationId, Location>,
    pub vehicles: MapType<VehicleId, Vehicle>,
    pub orders: MapType<OrderId, Order>,
    pub canceled_orders: Vec<OrderId>,
    /// Docking-capacity resources, created up front via `create_resource`
    /// and referenced from `Location::resource`. Lives on `Model` rather
    /// than `Simulation` so a `Location` can carry a valid `ResourceId`
    /// from the moment it's built.
    pub resources: ResourceTable,
    /// Free-form extra state surfaced verbatim in the JSON snapshot's
    /// `aux` field; unused by the engine itself.
    pub aux: Value,
}

impl Model {
    pub fn new() -> Self {
        Self {
            aux: Value::Object(Default::default()),
            ..Default::default()
        }
    }

    /// Creates a docking-capacity resource of the given size, to be
    /// attached to a `Location` via `Location::with_resource`.
    pub fn create_resource(&mut self, capacity: i64) -> Result<ResourceId, ConfigError> {
        self.resources.create(capacity)
    }

    pub fn add_location(&mut self, location: Location) -> Result<(), ModelError> {
        if self.locations.contains_key(&location.id) {
            return Err(ModelError::DuplicateId {
                kind: "location",
                id: location.id.to_string(),
            });
        }
        self.locations.insert(location.id.clone(), location);
        Ok(())
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<(), SetupError> {
        if self.vehicles.contains_key(&vehicle.id) {
            return Err(ModelError::DuplicateId {
                kind: "vehicle",
                id: vehicle.id.to_string(),
            }
            .into());
        }
        if !self.locations.contains_key(&vehicle.initial_location) {
            return Err(ModelError::UnknownLocation(vehicle.initial_location.clone()).into());
        }
        if let Some(capacity) = vehicle.capacity {
            if capacity < 1 {
                return Err(ConfigError::InvalidCapacity(capacity).into());
            }
        }
        self.vehicles.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    pub fn add_order(&mut self, order: Order) -> Result<(), SetupError> {
        if self.orders.contains_key(&order.id) {
            return Err(ModelError::DuplicateId {
                kind: "order",
                id: order.id.to_string(),
            }
            .into());
        }
        if !self.locations.contains_key(&order.pickup_location) {
            return Err(ModelError::UnknownLocation(order.pickup_location.clone()).into());
        }
        if !self.locations.contains_key(&order.delivery_location) {
            return Err(ModelError::UnknownLocation(order.delivery_location.clone()).into());
        }
        if order.pickup_duration < 0.0 {
            return Err(ConfigError::NegativeDuration(order.pickup_duration).into());
        }
        if order.delivery_duration < 0.0 {
            return Err(ConfigError::NegativeDuration(order.delivery_duration).into());
        }
        if order.release_date < SimTime::ZERO {
            return Err(ConfigError::NegativeReleaseDate(order.id.clone()).into());
        }
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    /// Re-validates structural invariants after setup is otherwise
    /// complete; `run` calls this before starting the event loop.
    pub fn validate(&self) -> Result<(), ModelError> {
        for vehicle in self.vehicles.values() {
            if !self.locations.contains_key(&vehicle.initial_location) {
                return Err(ModelError::UnknownLocation(vehicle.initial_location.clone()));
            }
        }
        for order in self.orders.values() {
            if !self.locations.contains_key(&order.pickup_location) {
                return Err(ModelError::UnknownLocation(order.pickup_location.clone()));
            }
            if !self.locations.contains_key(&order.delivery_location) {
                return Err(ModelError::UnknownLocation(order.delivery_location.clone()));
            }
        }
        Ok(())
    }

    /// Whether `order_id` is already referenced in some vehicle's current
    /// or tentative route, i.e. it was accepted in an earlier routing
    /// cycle.
    pub fn order_already_routed(&self, order_id: &OrderId) -> bool {
        self.vehicles.values().any(|v| {
            v.current_visit
                .iter()
                .chain(v.next_visits.iter())
                .any(|visit| visit.pickup_list.contains(order_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vehicle;

    #[test]
    fn rejects_duplicate_location_id() {
        let mut model = Model::new();
        model.add_location(Location::new("A")).unwrap();
        let err = model.add_location(Location::new("A")).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { kind: "location", .. }));
    }

    #[test]
    fn rejects_vehicle_at_unknown_location() {
        let mut model = Model::new();
        let err = model.add_vehicle(Vehicle::new("V1", "NOWHERE")).unwrap_err();
        assert!(matches!(err, SetupError::Model(ModelError::UnknownLocation(_))));
    }

    #[test]
    fn rejects_order_with_unknown_delivery_location() {
        let mut model = Model::new();
        model.add_location(Location::new("A")).unwrap();
        let err = model
            .add_order(crate::model::Order::new("O-1", "A", "NOWHERE", 0.0))
            .unwrap_err();
        assert!(matches!(err, SetupError::Model(ModelError::UnknownLocation(_))));
    }

    #[test]
    fn rejects_vehicle_with_nonpositive_capacity() {
        let mut model = Model::new();
        model.add_location(Location::new("A")).unwrap();
        let err = model
            .add_vehicle(Vehicle::new("V1", "A").with_capacity(0))
            .unwrap_err();
        assert!(matches!(err, SetupError::Config(ConfigError::InvalidCapacity(0))));
    }

    #[test]
    fn rejects_order_with_negative_release_date() {
        let mut model = Model::new();
        model.add_location(Location::new("A")).unwrap();
        let err = model
            .add_order(crate::model::Order::new("O-1", "A", "A", -1.0))
            .unwrap_err();
        assert!(matches!(err, SetupError::Config(ConfigError::NegativeReleaseDate(_))));
    }

    #[test]
    fn create_resource_rejects_nonpositive_capacity() {
        let mut model = Model::new();
        assert!(model.create_resource(0).is_err());
        assert!(model.create_resource(1).is_ok());
    }
}
