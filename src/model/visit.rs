//! `Visit`: an atomic stop at a location with pickup/delivery lists.

use serde::{Deserialize, Serialize};

use super::{LocationId, OrderId};
use crate::time::SimTime;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Visit {
    pub location: LocationId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pickup_list: Vec<OrderId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delivery_list: Vec<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_start_time: Option<SimTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_start_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_finish_time: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<SimTime>,
}

impl Default for LocationId {
    fn default() -> Self {
        LocationId(String::new())
    }
}

impl Visit {
    pub fn new(location: impl Into<LocationId>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_pickup(mut self, orders: impl IntoIterator<Item = OrderId>) -> Self {
        self.pickup_list = orders.into_iter().collect();
        self
    }

    pub fn with_delivery(mut self, orders: impl IntoIterator<Item = OrderId>) -> Self {
        self.delivery_list = orders.into_iter().collect();
        self
    }

    pub fn with_earliest_start_time(mut self, t: impl Into<SimTime>) -> Self {
        self.earliest_start_time = Some(t.into());
        self
    }

    /// The vehicle's resting visit before any route has ever been
    /// planned: no pickups or deliveries, already "arrived".
    pub fn stationary(location: impl Into<LocationId>) -> Self {
        Self {
            location: location.into(),
            arrival_time: Some(SimTime::ZERO),
            ..Default::default()
        }
    }

    pub fn is_empty_stop(&self) -> bool {
        self.pickup_list.is_empty() && self.delivery_list.is_empty()
    }
}
