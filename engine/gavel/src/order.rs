use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderType, Price, Qty, Side, UserId};

/// A single incoming or resting order. Once resting, it is referenced from
/// exactly one price level and one locator entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub side: Side,
    pub order_type: OrderType,
    /// `None` for MARKET orders, which match at any price.
    pub limit_price: Option<Price>,
    /// Remaining quantity; decremented as fills occur.
    pub quantity: Qty,
    /// Original size, immutable for the order's lifetime.
    pub initial_quantity: Qty,
    /// Arrival time in nanoseconds since the epoch. Audit only: matching
    /// priority comes from queue position, never from this field.
    pub timestamp_ns: u64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        user_id: UserId,
        side: Side,
        order_type: OrderType,
        limit_price: Option<Price>,
        quantity: Qty,
        timestamp_ns: u64,
    ) -> Self {
        Self {
            order_id,
            user_id,
            side,
            order_type,
            limit_price,
            quantity,
            initial_quantity: quantity,
            timestamp_ns,
        }
    }

    /// Whether this order may execute against a resting level at `level_price`.
    #[inline]
    pub fn crosses(&self, level_price: Price) -> bool {
        self.side.crosses(self.limit_price, level_price)
    }

    #[inline]
    pub fn filled_quantity(&self) -> Qty {
        self.initial_quantity - self.quantity
    }
}
