//! Error taxonomy. Kinds, not a single catch-all.
//!
//! `ModelError`/`ConfigError` are setup-time and fatal to `Model::run`.
//! `DecisionError` aborts only the current routing cycle; the coordinator
//! rejects the whole decision rather than partially applying it.
//! `RuntimeWarning` is not an `Error` — it never changes control flow, it
//! is only logged and collected (see `Model::warnings`).

use thiserror::Error;

use crate::model::{LocationId, OrderId, VehicleId};
use crate::time::SimTime;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown location referenced: {0}")]
    UnknownLocation(LocationId),
    #[error("vehicle {0} has no initial location")]
    MissingInitialLocation(VehicleId),
    #[error("duplicate id: {kind} {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("vehicle {0} has an empty route but a non-empty visit list was expected")]
    EmptyRoute(VehicleId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duration must be >= 0, got {0}")]
    NegativeDuration(f64),
    #[error("capacity must be >= 1, got {0}")]
    InvalidCapacity(i64),
    #[error("resource capacity must be >= 1, got {0}")]
    InvalidResourceCapacity(i64),
    #[error("order {0} has a negative release_date")]
    NegativeReleaseDate(OrderId),
}

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("decision references unknown order {0}")]
    UnknownOrder(OrderId),
    #[error("decision references unknown vehicle {0}")]
    UnknownVehicle(VehicleId),
    #[error("order {0} is not OPEN or POSTPONED, cannot be dispositioned")]
    OrderNotOpen(OrderId),
    #[error("order {0} postponed to {1} which is not after current time {2}")]
    PostponedNotInFuture(OrderId, SimTime, SimTime),
    #[error("vehicle {0}: current_visit service already started, it cannot be rewritten")]
    CommittedVisitRewritten(VehicleId),
    #[error("vehicle {0}: en route, next_visits[0].location must equal the in-flight destination")]
    EnRouteDestinationChanged(VehicleId),
    #[error("vehicle {0}: order {1} is canceled or rejected, it cannot appear in a visit list")]
    CanceledOrderInVisit(VehicleId, OrderId),
    #[error("vehicle {0}: LIFO invariant violated")]
    LifoViolation(VehicleId),
    #[error("vehicle {0}: capacity invariant violated")]
    CapacityExceeded(VehicleId),
    #[error("vehicle {0}: order {1} appears in a pickup_list without being accepted")]
    PickupOfUnacceptedOrder(VehicleId, OrderId),
    #[error("routing callback failed: {0}")]
    Callback(#[from] anyhow::Error),
}

/// Non-fatal conditions, logged via `tracing::warn!` and additionally
/// collected on the model for programmatic inspection.
#[derive(Debug, Clone)]
pub enum RuntimeWarning {
    NoRoutingCallback,
    OrderNotDeliveredByHorizon(OrderId),
    OpenOrderWithoutDecision(OrderId),
    /// A visit still named a canceled order at service time; the engine
    /// skipped that pickup/delivery step rather than act on stale data.
    CanceledOrderSkipped(VehicleId, OrderId),
}

impl std::fmt::Display for RuntimeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeWarning::NoRoutingCallback => {
                write!(f, "no routing callback registered, auto-rejecting open orders")
            }
            RuntimeWarning::OrderNotDeliveredByHorizon(id) => {
                write!(f, "order {id} accepted but not delivered by end of horizon")
            }
            RuntimeWarning::OpenOrderWithoutDecision(id) => {
                write!(f, "order {id} is open but no decision was made on it")
            }
            RuntimeWarning::CanceledOrderSkipped(vehicle, order) => {
                write!(f, "vehicle {vehicle}: skipped service step for canceled order {order}")
            }
        }
    }
}

/// Setup-time failure from `Simulation::new`: either the model or the
/// configuration failed validation.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
