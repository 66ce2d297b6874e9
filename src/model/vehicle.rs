//! `Vehicle`: identity, capacity, loading rule, and the dynamic execution
//! state the vehicle process (`crate::vehicle_exec`) mutates.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::define_id;
use super::{LocationId, OrderId, Visit};

define_id!(VehicleId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadingRule {
    Free,
    Lifo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleStatus {
    EnRoute,
    WaitingForService,
    UnderService,
    Idle,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub initial_location: LocationId,
    pub capacity: Option<i64>,
    pub loading_rule: LoadingRule,

    pub status: VehicleStatus,
    /// Set while `EN_ROUTE`: the visit most recently completed, kept so
    /// travel_time(prev, dest) has an origin.
    pub previous_visit: Option<Visit>,
    /// Set otherwise: the visit being (or about to be) served.
    pub current_visit: Option<Visit>,
    /// Tentative route; `next_visits[0]` becomes `current_visit` once
    /// popped as a commitment.
    pub next_visits: VecDeque<Visit>,
    /// Ordered by pickup (push order); under LIFO this is the physical
    /// stack order.
    pub carrying_orders: Vec<OrderId>,
}

impl Vehicle {
    pub fn new(id: impl Into<VehicleId>, initial_location: impl Into<LocationId>) -> Self {
        let initial_location = initial_location.into();
        Self {
            id: id.into(),
            initial_location: initial_location.clone(),
            capacity: None,
            loading_rule: LoadingRule::Free,
            status: VehicleStatus::Idle,
            previous_visit: None,
            current_visit: Some(Visit::stationary(initial_location)),
            next_visits: VecDeque::new(),
            carrying_orders: Vec::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_loading_rule(mut self, loading_rule: LoadingRule) -> Self {
        self.loading_rule = loading_rule;
        self
    }

    /// The location the vehicle currently occupies or is headed to: the
    /// current visit's location if set, else the in-flight destination.
    pub fn position(&self) -> &LocationId {
        if let Some(v) = &self.current_visit {
            &v.location
        } else if let Some(v) = self.next_visits.front() {
            &v.location
        } else {
            &self.previous_visit.as_ref().unwrap().location
        }
    }
}
