//! Order lifecycle transitions outside of pickup/delivery: release,
//! postponement expiry, and cancellation.

use crate::model::{OrderId, OrderStatus};
use crate::simulation::Simulation;

impl Simulation {
    /// `order_process`'s first step: an `UNREQUESTED` order becomes `OPEN`
    /// at its release date and, unless configured otherwise, immediately
    /// raises a routing request.
    pub(crate) fn request_order(&mut self, order_id: OrderId, raise_routing: bool) {
        let order = self.model.orders.gets_mut(&order_id);
        if order.status != OrderStatus::Unrequested {
            return;
        }
        order.status = OrderStatus::Open;
        tracing::debug!(order = %order_id, "order released");
        self.call_model_hook(|h, ctx| h.on_order_request(ctx, &order_id));
        if raise_routing {
            self.request_for_routing();
        }
    }

    /// A postponed order's self-imposed timer has elapsed; it becomes
    /// `OPEN` again and a routing request fires.
    pub(crate) fn reopen_postponed(&mut self, order_id: OrderId) {
        let order = self.model.orders.gets_mut(&order_id);
        if order.status != OrderStatus::Postponed {
            return;
        }
        order.status = OrderStatus::Open;
        order.postponed_until = None;
        self.request_for_routing();
    }

    /// Cancels an order. Any vehicle still carrying a route reference to
    /// it keeps that reference until the next decision is applied, at
    /// which point `validate_order_not_canceled` forces the reference out;
    /// if service is attempted on it before that, the engine skips the
    /// step rather than act on stale data.
    pub fn cancel_order(&mut self, order_id: OrderId) {
        let order = self.model.orders.gets_mut(&order_id);
        if order.status.is_terminal() {
            return;
        }
        order.status = OrderStatus::Canceled;
        self.model.canceled_orders.push(order_id);
        self.request_for_routing();
    }
}
