//! Main OrderGateway implementation

use std::sync::Arc;

use gavel::{Order, OrderIdAllocator, PriceScale};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::broadcaster::Broadcaster;
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::feed::FeedChannel;
use crate::submission::SubmissionChannel;

/// Binds the three endpoints and owns the feed broadcasters. The gateway
/// never touches book state: submissions go onto the engine queue, and
/// the engine loop hands frames back through [`OrderGateway::trades`] and
/// [`OrderGateway::market_data`].
pub struct OrderGateway {
    config: GatewayConfig,
    submission: Arc<SubmissionChannel>,
    market_data: Arc<Broadcaster>,
    trades: Arc<Broadcaster>,
}

impl OrderGateway {
    pub fn new(
        config: GatewayConfig,
        scale: PriceScale,
        allocator: Arc<OrderIdAllocator>,
        engine_tx: mpsc::UnboundedSender<Order>,
    ) -> Self {
        Self {
            config,
            submission: Arc::new(SubmissionChannel::new(scale, allocator, engine_tx)),
            // market data replays the latest snapshot to each new client
            market_data: Arc::new(Broadcaster::new(true)),
            trades: Arc::new(Broadcaster::new(false)),
        }
    }

    pub fn market_data(&self) -> Arc<Broadcaster> {
        self.market_data.clone()
    }

    pub fn trades(&self) -> Arc<Broadcaster> {
        self.trades.clone()
    }

    /// Bind all three listeners and serve until the task is aborted or a
    /// listener fails.
    pub async fn start(&self) -> GatewayResult<()> {
        let orders = TcpListener::bind(self.config.orders_addr).await?;
        let market_data = TcpListener::bind(self.config.market_data_addr).await?;
        let trades = TcpListener::bind(self.config.trades_addr).await?;

        info!("order submission listening on ws://{}", self.config.orders_addr);
        info!("market data feed listening on ws://{}", self.config.market_data_addr);
        info!("trade feed listening on ws://{}", self.config.trades_addr);

        tokio::try_join!(
            self.submission.clone().run(orders),
            FeedChannel::new("market-data", self.market_data.clone()).run(market_data),
            FeedChannel::new("trade-feed", self.trades.clone()).run(trades),
        )?;
        Ok(())
    }
}
