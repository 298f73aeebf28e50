//! The single-writer matching loop.
//!
//! One order at a time: dequeue, match, persist, broadcast. The snapshot
//! write completes before the next order is taken, so the durable state
//! and the emitted trades never diverge. For each processed order the
//! trade frame is published before the L2 frame.

use std::sync::Arc;

use anyhow::{Context, Result};
use gavel::{Gavel, Order, OrderIdAllocator};
use order_gateway::{Broadcaster, FeedFrame};
use persistence::{BookSnapshot, SnapshotStore};
use tokio::sync::mpsc;
use tracing::{error, info};

pub struct EngineLoop {
    core: Gavel,
    allocator: Arc<OrderIdAllocator>,
    queue: mpsc::UnboundedReceiver<Order>,
    store: SnapshotStore,
    trades: Arc<Broadcaster>,
    market_data: Arc<Broadcaster>,
}

impl EngineLoop {
    pub fn new(
        core: Gavel,
        allocator: Arc<OrderIdAllocator>,
        queue: mpsc::UnboundedReceiver<Order>,
        store: SnapshotStore,
        trades: Arc<Broadcaster>,
        market_data: Arc<Broadcaster>,
    ) -> Self {
        Self { core, allocator, queue, store, trades, market_data }
    }

    /// Run until the queue closes. Broadcast problems are logged and
    /// skipped; a persistence failure is fatal because acknowledged orders
    /// would otherwise be silently dropped on the next crash.
    pub async fn run(mut self) -> Result<()> {
        info!("matching core started; waiting for orders");

        // prime the market-data cache so a subscriber that connects before
        // the first order still receives the current (possibly recovered) book
        publish(&self.market_data, &FeedFrame::L2Update(self.core.l2_snapshot())).await;

        while let Some(order) = self.queue.recv().await {
            let order_id = order.order_id;
            let trades = self.core.process_order(order);

            let snapshot = BookSnapshot::capture(self.core.book(), self.allocator.current());
            self.store
                .save(&snapshot)
                .with_context(|| format!("snapshot write failed after order {order_id}"))?;

            if !trades.is_empty() {
                publish(&self.trades, &FeedFrame::TradeReport { trades }).await;
            }
            publish(&self.market_data, &FeedFrame::L2Update(self.core.l2_snapshot())).await;
        }

        info!("engine queue closed; matching core stopped");
        Ok(())
    }
}

async fn publish(broadcaster: &Broadcaster, frame: &FeedFrame) {
    match serde_json::to_string(frame) {
        Ok(encoded) => broadcaster.publish(encoded).await,
        Err(e) => error!("failed to encode feed frame: {e}"),
    }
}
