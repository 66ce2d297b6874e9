//! `Order`: pickup-and-delivery request with a release date, optional time
//! windows, and a derived lifecycle status.

use serde::{Deserialize, Serialize};

use super::define_id;
use super::{LocationId, VehicleId};
use crate::time::{Duration, SimTime};

define_id!(OrderId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Unrequested,
    Open,
    Postponed,
    Rejected,
    Canceled,
    PickedUp,
    Delivered,
}

impl OrderStatus {
    /// Open or postponed orders are the only ones a decision may touch.
    pub fn is_decidable(self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Postponed)
    }

    /// Requested, not yet rejected/canceled/delivered (GLOSSARY "Open order").
    pub fn is_open_ish(self) -> bool {
        matches!(
            self,
            OrderStatus::Open | OrderStatus::Postponed | OrderStatus::PickedUp
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Canceled | OrderStatus::Delivered
        )
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub pickup_location: LocationId,
    pub delivery_location: LocationId,
    pub release_date: SimTime,
    pub due_date: Option<SimTime>,
    pub earliest_service_start_pickup: Option<SimTime>,
    pub latest_service_start_pickup: Option<SimTime>,
    pub earliest_service_start_delivery: Option<SimTime>,
    pub latest_service_start_delivery: Option<SimTime>,
    pub pickup_duration: Duration,
    pub delivery_duration: Duration,
    pub quantity: Option<i64>,

    pub status: OrderStatus,
    pub assigned_vehicle: Option<VehicleId>,
    pub pickup_time: Option<SimTime>,
    pub delivery_time: Option<SimTime>,
    /// Set when `status == Postponed`; the time the self-imposed routing
    /// request re-fires.
    pub postponed_until: Option<SimTime>,
}

impl Order {
    pub fn new(
        id: impl Into<OrderId>,
        pickup_location: impl Into<LocationId>,
        delivery_location: impl Into<LocationId>,
        release_date: impl Into<SimTime>,
    ) -> Self {
        Self {
            id: id.into(),
            pickup_location: pickup_location.into(),
            delivery_location: delivery_location.into(),
            release_date: release_date.into(),
            due_date: None,
            earliest_service_start_pickup: None,
            latest_service_start_pickup: None,
            earliest_service_start_delivery: None,
            latest_service_start_delivery: None,
            pickup_duration: 0.0,
            delivery_duration: 0.0,
            quantity: None,
            status: OrderStatus::Unrequested,
            assigned_vehicle: None,
            pickup_time: None,
            delivery_time: None,
            postponed_until: None,
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<SimTime>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_pickup_window(
        mut self,
        earliest: impl Into<SimTime>,
        latest: impl Into<SimTime>,
    ) -> Self {
        self.earliest_service_start_pickup = Some(earliest.into());
        self.latest_service_start_pickup = Some(latest.into());
        self
    }

    pub fn with_delivery_window(
        mut self,
        earliest: impl Into<SimTime>,
        latest: impl Into<SimTime>,
    ) -> Self {
        self.earliest_service_start_delivery = Some(earliest.into());
        self.latest_service_start_delivery = Some(latest.into());
        self
    }

    pub fn with_durations(mut self, pickup_duration: Duration, delivery_duration: Duration) -> Self {
        self.pickup_duration = pickup_duration;
        self.delivery_duration = delivery_duration;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}
