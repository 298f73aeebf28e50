//! Gavel - single-instrument continuous double-auction matching core.
//!
//! Strict price-time priority: best price first, then FIFO arrival order
//! within a level. One task owns the book and drives [`Gavel::process_order`]
//! for every incoming order; ingress and broadcast never touch book state.

mod book;
mod config;
mod events;
mod fees;
mod ids;
mod level;
mod order;
mod price;
mod types;

pub use book::{BookError, Fill, OrderBook, OrderLocator};
pub use config::{CfgError, EngineCfg};
pub use events::{L2Level, L2Snapshot, TradeReport};
pub use fees::FeeSchedule;
pub use ids::OrderIdAllocator;
pub use level::PriceLevel;
pub use order::Order;
pub use price::{PriceScale, ScaleError};
pub use types::{OrderId, OrderType, Price, Qty, Side, TradeId, UserId};

use std::time::Instant;

use tracing::debug;

/// Wall-clock seconds since the epoch, as carried on wire frames.
pub fn unix_time() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

/// The matching core: configuration plus the book it mutates. Single
/// writer; the owning loop processes one order to completion before the
/// next.
pub struct Gavel {
    cfg: EngineCfg,
    book: OrderBook,
}

impl Gavel {
    pub fn new(cfg: EngineCfg) -> Self {
        let book = OrderBook::new(cfg.symbol.clone());
        Self { cfg, book }
    }

    /// Resume from a recovered book (snapshot restore path).
    pub fn with_book(cfg: EngineCfg, book: OrderBook) -> Self {
        Self { cfg, book }
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn cfg(&self) -> &EngineCfg {
        &self.cfg
    }

    /// The waterfall: single entrypoint for all four order types. Returns
    /// the trade reports in fill order; the first one carries the matching
    /// latency. An infeasible FOK (or a zero-quantity order) returns an
    /// empty list with nothing mutated.
    pub fn process_order(&mut self, mut incoming: Order) -> Vec<TradeReport> {
        let started = Instant::now();

        if incoming.quantity == 0 {
            return Vec::new();
        }

        // FOK precheck: all-or-nothing feasibility against eligible volume,
        // decided before any state is touched.
        if incoming.order_type == OrderType::Fok {
            let available =
                self.book.eligible_volume(incoming.side, incoming.limit_price, incoming.quantity);
            if available < incoming.quantity {
                debug!(
                    order_id = incoming.order_id,
                    required = incoming.quantity,
                    available,
                    "FOK rejected: eligible volume short of the full quantity"
                );
                return Vec::new();
            }
        }

        let mut trades = Vec::new();
        let opposite = incoming.side.opposite();
        while incoming.quantity > 0 {
            let Some(level_price) = self.book.best_price(opposite) else { break };
            // trade-through protection: never execute past the taker's limit
            if !incoming.crosses(level_price) {
                break;
            }
            for fill in self.book.match_at(opposite, level_price, incoming.quantity) {
                incoming.quantity -= fill.quantity;
                trades.push(self.trade_report(&incoming, level_price, &fill));
            }
        }

        self.settle_remainder(incoming);

        if let Some(first) = trades.first_mut() {
            first.engine_latency_ns = Some(started.elapsed().as_nanos() as u64);
        }
        trades
    }

    /// Execution always happens at the resting level's price; the
    /// aggressor's limit never sets it.
    fn trade_report(&mut self, taker: &Order, price: Price, fill: &Fill) -> TradeReport {
        let value = self.cfg.scale.notional(price, fill.quantity);
        TradeReport {
            timestamp: unix_time(),
            symbol: self.cfg.symbol.clone(),
            trade_id: self.book.new_trade_id(),
            price: self.cfg.scale.price(price),
            quantity: self.cfg.scale.qty(fill.quantity),
            aggressor_side: taker.side,
            maker_order_id: fill.maker_order_id,
            taker_order_id: taker.order_id,
            taker_fee: self.cfg.fees.taker_fee(value),
            maker_fee: self.cfg.fees.maker_fee(value),
            engine_latency_ns: None,
        }
    }

    fn settle_remainder(&mut self, order: Order) {
        if order.quantity == 0 {
            return;
        }
        match order.order_type {
            OrderType::Limit => self.book.add_limit_order(order),
            OrderType::Market | OrderType::Ioc => {
                debug!(
                    order_id = order.order_id,
                    filled = order.filled_quantity(),
                    cancelled = order.quantity,
                    "unmarketable remainder cancelled"
                );
            }
            OrderType::Fok => {
                // the precheck guarantees a FOK that got this far fills completely
                debug_assert!(false, "FOK order left a remainder");
            }
        }
    }

    /// Current aggregated depth view, bounded by the configured level count.
    pub fn l2_snapshot(&self) -> L2Snapshot {
        let scale = &self.cfg.scale;
        let level = |(price, qty): (Price, Qty)| L2Level {
            price: scale.price(price),
            quantity: scale.qty(qty),
        };
        L2Snapshot {
            timestamp: unix_time(),
            symbol: self.cfg.symbol.clone(),
            bids: self.book.depth(Side::Buy, self.cfg.depth).into_iter().map(level).collect(),
            asks: self.book.depth(Side::Sell, self.cfg.depth).into_iter().map(level).collect(),
        }
    }
}
