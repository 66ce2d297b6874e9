//! Language-neutral JSON schemas for the state snapshot and the decision
//! an external routing algorithm returns.

use serde::{Deserialize, Serialize};

use crate::model::{LocationId, MapType, OrderId, OrderStatus, Visit, VehicleId, VehicleStatus};
use crate::time::SimTime;

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_visit: Option<Visit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_visit: Option<Visit>,
    pub next_visits: Vec<Visit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub carrying_orders: Vec<OrderId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub pickup_location: LocationId,
    pub delivery_location: LocationId,
    pub release_date: SimTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_service_start_pickup: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_service_start_pickup: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_service_start_delivery: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_service_start_delivery: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle: Option<VehicleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_vehicle: Option<VehicleId>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub time: SimTime,
    pub vehicles: MapType<VehicleId, VehicleSnapshot>,
    pub open_orders: MapType<OrderId, OrderSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub canceled_orders: Vec<OrderId>,
    pub aux: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDisposition {
    Accepted,
    Rejected,
    Postponed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderDecision {
    pub status: OrderDisposition,
    #[serde(default)]
    pub postponed_until: Option<SimTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleDecision {
    #[serde(default)]
    pub current_visit: Option<Visit>,
    #[serde(default)]
    pub next_visits: Vec<Visit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Decision {
    /// A missing key means "no change"; an explicit `null` is treated the
    /// same way (both deserialize to `None` here).
    #[serde(default)]
    pub vehicles: MapType<VehicleId, Option<VehicleDecision>>,
    #[serde(default)]
    pub orders: MapType<OrderId, OrderDecision>,
}

impl Decision {
    /// A decision with nothing in it is the documented no-op.
    pub fn is_noop(&self) -> bool {
        self.vehicles.values().all(Option::is_none) && self.orders.is_empty()
    }
}
