//! The routing decision seam: schema, validation, and the coordinator that
//! drives a routing cycle.

pub mod coordinator;
pub mod schema;
pub mod validate;

pub use schema::{Decision, OrderDecision, OrderDisposition, OrderSnapshot, StateSnapshot, VehicleDecision, VehicleSnapshot};
