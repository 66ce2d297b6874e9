//! Event loop & time, plus the shared-resource contention primitive.
//! There is no generic coroutine runtime here: each stateful component
//! (vehicle execution, the decision coordinator, the order provider) is
//! an explicit state machine whose `step` advances until the next
//! suspension, and suspensions are represented by scheduling a
//! `SimAction` on the queue below rather than blocking a coroutine frame.

pub mod event_queue;
pub mod resource;

use crate::model::{OrderId, VehicleId};

/// The closed set of reasons the engine re-enters a running component.
/// Each variant is a continuation: the action names which state machine
/// to resume and the dispatcher reads the rest of the context it needs
/// from `Simulation`'s own fields.
#[derive(Debug, Clone)]
pub enum SimAction {
    /// Resume a vehicle's execution loop. `epoch` pins this wake-up to
    /// the vehicle's `interrupt_epoch` at schedule time; if the
    /// coordinator has since interrupted an interruptible wait the
    /// epochs won't match and this fire is a stale no-op.
    VehicleStep { vehicle: VehicleId, epoch: u64 },
    /// An order's `release_date` has arrived; the order provider should
    /// call `request_order` for it.
    OrderRelease { order: OrderId },
    /// A postponed order's `postponed_until` has arrived.
    PostponementExpiry { order: OrderId },
    /// The periodic updater's timer has fired.
    PeriodicTick,
    /// The coalesced routing-request flag should be serviced.
    CoordinatorTick,
}
