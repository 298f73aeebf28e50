//! Component wiring: recover durable state, build the pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use gavel::{Gavel, OrderIdAllocator};
use order_gateway::OrderGateway;
use persistence::SnapshotStore;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::engine_loop::EngineLoop;

/// The wired service: one gateway (the three channels) and one engine
/// loop sharing an order queue, an id allocator, and the broadcasters.
pub struct Service {
    gateway: OrderGateway,
    engine: EngineLoop,
}

impl Service {
    /// Load the snapshot if one exists and assemble the pipeline.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let cfg = config.engine.engine_cfg();
        cfg.validate().context("invalid engine configuration")?;

        let snapshot_path = &config.persistence.snapshot_path;
        if let Some(dir) = snapshot_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create snapshot directory {dir:?}"))?;
            }
        }
        let store = SnapshotStore::new(snapshot_path);

        let (core, allocator) = match store.load().context("failed to load snapshot")? {
            Some(snapshot) => {
                info!(
                    resting_orders = snapshot.book.order_count(),
                    next_order_id = snapshot.next_order_id,
                    "resuming from snapshot"
                );
                (
                    Gavel::with_book(cfg, snapshot.book),
                    OrderIdAllocator::starting_at(snapshot.next_order_id),
                )
            }
            None => {
                info!("no snapshot found; starting with an empty book");
                (Gavel::new(cfg), OrderIdAllocator::starting_at(1))
            }
        };
        let allocator = Arc::new(allocator);

        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let gateway = OrderGateway::new(
            config.gateway.clone(),
            config.engine.engine_cfg().scale,
            allocator.clone(),
            engine_tx,
        );
        let engine = EngineLoop::new(
            core,
            allocator,
            engine_rx,
            store,
            gateway.trades(),
            gateway.market_data(),
        );

        Ok(Self { gateway, engine })
    }

    pub fn into_parts(self) -> (OrderGateway, EngineLoop) {
        (self.gateway, self.engine)
    }
}
