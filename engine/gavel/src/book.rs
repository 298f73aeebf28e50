use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Order, OrderId, OrderType, Price, PriceLevel, Qty, Side, TradeId};

/// Where a resting order lives: enough to reach it in O(log n) without
/// scanning either side. Maintained on every insertion and removal; a
/// cancel operation would consume it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLocator {
    pub side: Side,
    pub price: Price,
}

/// One fill produced while walking a price level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    pub maker_order_id: OrderId,
    pub quantity: Qty,
}

#[derive(Debug, Error)]
pub enum BookError {
    #[error("book is crossed: best bid {bid} >= best ask {ask}")]
    Crossed { bid: Price, ask: Price },
    #[error("empty price level at {price} on the {side:?} side")]
    EmptyLevel { side: Side, price: Price },
    #[error("level volume mismatch at {price} on the {side:?} side: recorded {recorded}, actual {actual}")]
    VolumeMismatch { side: Side, price: Price, recorded: Qty, actual: Qty },
    #[error("resting order {order_id} is malformed")]
    BadRestingOrder { order_id: OrderId },
    #[error("locator map disagrees with the book for order {order_id}")]
    BadLocator { order_id: OrderId },
    #[error("trade counter {counter} does not clear every persisted id")]
    StaleCounter { counter: u64 },
}

/// The root aggregate for one instrument: both sides keyed by integer tick
/// price, the order locator map, and the trade-id counter. Strictly
/// single-writer; nothing here is synchronized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderBook {
    symbol: String,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    orders: HashMap<OrderId, OrderLocator>,
    next_trade_id: TradeId,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
            next_trade_id: 1,
        }
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current counter value, then post-increment.
    pub fn new_trade_id(&mut self) -> TradeId {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    #[inline]
    pub fn next_trade_id(&self) -> TradeId {
        self.next_trade_id
    }

    #[inline]
    fn side(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Best price on `side` in that side's matching priority.
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.best_bid(),
            Side::Sell => self.best_ask(),
        }
    }

    pub fn best_bid_offer(&self) -> (Option<Price>, Option<Price>) {
        (self.best_bid(), self.best_ask())
    }

    /// Rest a non-marketable limit order at the tail of its price level,
    /// creating the level if absent. Caller guarantees LIMIT type, a
    /// concrete price, and positive quantity.
    pub fn add_limit_order(&mut self, order: Order) {
        debug_assert_eq!(order.order_type, OrderType::Limit);
        debug_assert!(order.quantity > 0);
        let Some(price) = order.limit_price else {
            debug_assert!(false, "limit order without a price");
            return;
        };
        self.orders.insert(order.order_id, OrderLocator { side: order.side, price });
        self.side_mut(order.side).entry(price).or_default().push_back(order);
    }

    /// Fill up to `budget` against the FIFO at `price` on `side`, oldest
    /// order first. Updates level totals, drops exhausted orders from the
    /// level and the locator map, and removes the level once empty.
    /// Returns the fills in execution order.
    pub fn match_at(&mut self, side: Side, price: Price, budget: Qty) -> Vec<Fill> {
        let mut fills = Vec::new();
        let mut remaining = budget;
        let mut exhausted_ids = Vec::new();
        let mut level_emptied = false;

        if let Some(level) = self.side_mut(side).get_mut(&price) {
            while remaining > 0 {
                let Some(resting) = level.front_mut() else { break };
                let fill_qty = remaining.min(resting.quantity);
                resting.quantity -= fill_qty;
                remaining -= fill_qty;
                let maker_order_id = resting.order_id;
                let done = resting.quantity == 0;
                level.reduce(fill_qty);
                if done {
                    level.pop_front();
                    exhausted_ids.push(maker_order_id);
                }
                fills.push(Fill { maker_order_id, quantity: fill_qty });
            }
            level_emptied = level.is_empty();
        }

        for id in &exhausted_ids {
            self.orders.remove(id);
        }
        if level_emptied {
            self.side_mut(side).remove(&price);
        }
        fills
    }

    /// Opposing volume reachable by a taker on `taker_side` with `limit`,
    /// walked in priority order and capped once `required` is covered.
    pub fn eligible_volume(&self, taker_side: Side, limit: Option<Price>, required: Qty) -> Qty {
        let levels: Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_> = match taker_side {
            Side::Buy => Box::new(self.asks.iter()),
            Side::Sell => Box::new(self.bids.iter().rev()),
        };
        let mut available: Qty = 0;
        for (&price, level) in levels {
            if !taker_side.crosses(limit, price) {
                break;
            }
            available += level.total_volume();
            if available >= required {
                break;
            }
        }
        available
    }

    /// Aggregated (price, volume) pairs for the top `levels` of `side`,
    /// bids descending and asks ascending.
    pub fn depth(&self, side: Side, levels: usize) -> Vec<(Price, Qty)> {
        let volume = |(&price, level): (&Price, &PriceLevel)| (price, level.total_volume());
        match side {
            Side::Buy => self.bids.iter().rev().take(levels).map(volume).collect(),
            Side::Sell => self.asks.iter().take(levels).map(volume).collect(),
        }
    }

    #[inline]
    pub fn locator(&self, order_id: OrderId) -> Option<&OrderLocator> {
        self.orders.get(&order_id)
    }

    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn max_resting_order_id(&self) -> Option<OrderId> {
        self.orders.keys().max().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Check every structural invariant: the book is not crossed, no level
    /// is empty, level totals equal the sum of their orders, every resting
    /// order agrees with its locator entry, and the trade counter clears
    /// every assigned id. Used by snapshot restore and by tests.
    pub fn validate(&self) -> Result<(), BookError> {
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return Err(BookError::Crossed { bid, ask });
            }
        }
        if self.next_trade_id == 0 {
            return Err(BookError::StaleCounter { counter: 0 });
        }

        let mut seen = 0usize;
        for side in [Side::Buy, Side::Sell] {
            for (&price, level) in self.side(side) {
                if level.is_empty() {
                    return Err(BookError::EmptyLevel { side, price });
                }
                let actual: Qty = level.orders().map(|o| o.quantity).sum();
                if actual != level.total_volume() {
                    return Err(BookError::VolumeMismatch {
                        side,
                        price,
                        recorded: level.total_volume(),
                        actual,
                    });
                }
                for order in level.orders() {
                    if order.quantity == 0
                        || order.quantity > order.initial_quantity
                        || order.order_type != OrderType::Limit
                        || order.limit_price != Some(price)
                        || order.side != side
                    {
                        return Err(BookError::BadRestingOrder { order_id: order.order_id });
                    }
                    match self.orders.get(&order.order_id) {
                        Some(loc) if loc.side == side && loc.price == price => seen += 1,
                        _ => return Err(BookError::BadLocator { order_id: order.order_id }),
                    }
                }
            }
        }
        // every locator entry was matched by exactly one resting order
        if seen != self.orders.len() {
            let orphan = self
                .orders
                .keys()
                .copied()
                .max()
                .unwrap_or_default();
            return Err(BookError::BadLocator { order_id: orphan });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: OrderId, side: Side, price: Price, qty: Qty) -> Order {
        Order::new(id, 1, side, OrderType::Limit, Some(price), qty, 0)
    }

    fn seeded_book() -> OrderBook {
        let mut book = OrderBook::new("BTC-USDT");
        book.add_limit_order(limit(1, Side::Buy, 98, 10));
        book.add_limit_order(limit(2, Side::Buy, 95, 15));
        book.add_limit_order(limit(3, Side::Sell, 104, 20));
        book.add_limit_order(limit(4, Side::Sell, 105, 10));
        book
    }

    #[test]
    fn bbo_tracks_both_sides() {
        let mut book = OrderBook::new("BTC-USDT");
        assert_eq!(book.best_bid_offer(), (None, None));

        book.add_limit_order(limit(1, Side::Buy, 98, 10));
        book.add_limit_order(limit(2, Side::Buy, 95, 15));
        assert_eq!(book.best_bid_offer(), (Some(98), None));

        book.add_limit_order(limit(3, Side::Sell, 104, 20));
        book.add_limit_order(limit(4, Side::Sell, 105, 10));
        assert_eq!(book.best_bid_offer(), (Some(98), Some(104)));
        book.validate().unwrap();
    }

    #[test]
    fn locator_follows_insertion_and_removal() {
        let mut book = seeded_book();
        assert_eq!(book.order_count(), 4);
        assert_eq!(book.locator(3), Some(&OrderLocator { side: Side::Sell, price: 104 }));

        // consume all of order 3; the level and locator must both go
        let fills = book.match_at(Side::Sell, 104, 20);
        assert_eq!(fills, vec![Fill { maker_order_id: 3, quantity: 20 }]);
        assert!(!book.contains_order(3));
        assert_eq!(book.best_ask(), Some(105));
        book.validate().unwrap();
    }

    #[test]
    fn match_at_respects_fifo_within_level() {
        let mut book = OrderBook::new("BTC-USDT");
        book.add_limit_order(limit(1, Side::Sell, 50, 5));
        book.add_limit_order(limit(2, Side::Sell, 50, 5));
        book.add_limit_order(limit(3, Side::Sell, 50, 5));

        let fills = book.match_at(Side::Sell, 50, 7);
        assert_eq!(
            fills,
            vec![
                Fill { maker_order_id: 1, quantity: 5 },
                Fill { maker_order_id: 2, quantity: 2 },
            ]
        );
        // order 2 still resting with the remainder, order 3 untouched
        assert!(book.contains_order(2));
        assert!(book.contains_order(3));
        assert_eq!(book.depth(Side::Sell, 1), vec![(50, 8)]);
        book.validate().unwrap();
    }

    #[test]
    fn match_at_budget_of_whole_level_removes_it() {
        let mut book = seeded_book();
        let fills = book.match_at(Side::Buy, 98, 100);
        assert_eq!(fills, vec![Fill { maker_order_id: 1, quantity: 10 }]);
        assert_eq!(book.best_bid(), Some(95));
        book.validate().unwrap();
    }

    #[test]
    fn eligible_volume_walks_priority_order() {
        let book = seeded_book();

        // BUY limited to 104 only reaches the first ask level
        assert_eq!(book.eligible_volume(Side::Buy, Some(104), 100), 20);
        // BUY at 105 reaches both
        assert_eq!(book.eligible_volume(Side::Buy, Some(105), 100), 30);
        // MARKET reaches everything
        assert_eq!(book.eligible_volume(Side::Buy, None, 100), 30);
        // early exit once the requirement is covered
        assert_eq!(book.eligible_volume(Side::Buy, None, 15), 20);
        // SELL above every bid reaches nothing
        assert_eq!(book.eligible_volume(Side::Sell, Some(100), 1), 0);
    }

    #[test]
    fn depth_orders_and_truncates() {
        let mut book = OrderBook::new("BTC-USDT");
        for (i, price) in (90..102).enumerate() {
            book.add_limit_order(limit(i as u64 + 1, Side::Buy, price, 1));
        }
        let depth = book.depth(Side::Buy, 10);
        assert_eq!(depth.len(), 10);
        assert_eq!(depth.first(), Some(&(101, 1)));
        assert_eq!(depth.last(), Some(&(92, 1)));
    }

    #[test]
    fn validate_catches_crossed_book() {
        let mut book = OrderBook::new("BTC-USDT");
        book.add_limit_order(limit(1, Side::Buy, 105, 10));
        book.add_limit_order(limit(2, Side::Sell, 104, 10));
        assert!(matches!(book.validate(), Err(BookError::Crossed { bid: 105, ask: 104 })));
    }
}
