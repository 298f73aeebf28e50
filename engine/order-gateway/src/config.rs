//! Configuration for the OrderGateway

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Listen endpoints for the three channels. Each channel is an
/// independent WebSocket listener carrying one JSON object per text frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Order submission (request/reply).
    pub orders_addr: SocketAddr,

    /// L2 market-data pushes.
    pub market_data_addr: SocketAddr,

    /// Trade execution report pushes.
    pub trades_addr: SocketAddr,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            orders_addr: ([127, 0, 0, 1], 8000).into(),
            market_data_addr: ([127, 0, 0, 1], 8001).into(),
            trades_addr: ([127, 0, 0, 1], 8002).into(),
        }
    }
}

impl GatewayConfig {
    /// The three endpoints must not collide.
    pub fn addrs_are_distinct(&self) -> bool {
        self.orders_addr != self.market_data_addr
            && self.orders_addr != self.trades_addr
            && self.market_data_addr != self.trades_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_are_distinct() {
        assert!(GatewayConfig::default().addrs_are_distinct());
    }

    #[test]
    fn detects_colliding_endpoints() {
        let mut config = GatewayConfig::default();
        config.trades_addr = config.orders_addr;
        assert!(!config.addrs_are_distinct());
    }
}
