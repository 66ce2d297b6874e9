//! `Location`: identity, optional coordinates, optional service resource.

use serde::{Deserialize, Serialize};

use super::define_id;
use crate::engine::resource::ResourceId;

define_id!(LocationId);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Created before `run` and immutable thereafter.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: LocationId,
    pub coordinates: Option<Coordinates>,
    /// Present iff the location serializes service behind a counted
    /// semaphore (a dock with finite capacity); `None` means unlimited
    /// concurrent service.
    pub resource: Option<ResourceId>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>) -> Self {
        Self {
            id: id.into(),
            coordinates: None,
            resource: None,
        }
    }

    pub fn with_coordinates(mut self, x: f64, y: f64) -> Self {
        self.coordinates = Some(Coordinates { x, y });
        self
    }

    pub fn with_resource(mut self, resource: ResourceId) -> Self {
        self.resource = Some(resource);
        self
    }
}
