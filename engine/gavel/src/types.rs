use serde::{Deserialize, Serialize};

pub type OrderId = u64;
pub type TradeId = u64;
pub type UserId = u64;

/// Integer multiple of the configured tick size.
pub type Price = u64;
/// Integer multiple of the configured lot size.
pub type Qty = u64;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    #[inline]
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether an order on this side with `limit` may execute at
    /// `level_price`. `None` (MARKET) is permissive at any price; equality
    /// is marketable on both sides.
    #[inline]
    pub fn crosses(&self, limit: Option<Price>, level_price: Price) -> bool {
        match (self, limit) {
            (_, None) => true,
            (Side::Buy, Some(limit)) => limit >= level_price,
            (Side::Sell, Some(limit)) => limit <= level_price,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit = 0,
    Market = 1,
    Ioc = 2,
    Fok = 3,
}
