use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, Side, TradeId};

/// Execution report for a single fill. Immutable once emitted; decimal
/// fields serialize as JSON numbers on the trade feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeReport {
    /// Wall-clock seconds since the epoch.
    pub timestamp: f64,
    pub symbol: String,
    pub trade_id: TradeId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub aggressor_side: Side,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub taker_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub maker_fee: Decimal,
    /// Matching wall time for the originating order; carried by the first
    /// report of a batch only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_latency_ns: Option<u64>,
}

/// One aggregated price level in an L2 view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct L2Level {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

/// Top-of-book depth view: bids descending, asks ascending, bounded per
/// side by the engine's configured depth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct L2Snapshot {
    pub timestamp: f64,
    pub symbol: String,
    pub bids: Vec<L2Level>,
    pub asks: Vec<L2Level>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_field_is_omitted_when_absent() {
        let report = TradeReport {
            timestamp: 0.0,
            symbol: "BTC-USDT".into(),
            trade_id: 1,
            price: Decimal::from(104),
            quantity: Decimal::from(20),
            aggressor_side: Side::Buy,
            maker_order_id: 3,
            taker_order_id: 5,
            taker_fee: Decimal::new(416, 2),
            maker_fee: Decimal::new(208, 2),
            engine_latency_ns: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("engine_latency_ns").is_none());
        assert_eq!(json["price"], serde_json::json!(104.0));
        assert_eq!(json["taker_fee"], serde_json::json!(4.16));
        assert_eq!(json["aggressor_side"], "BUY");
    }

    #[test]
    fn latency_field_round_trips_when_present() {
        let mut report: TradeReport = serde_json::from_value(serde_json::json!({
            "timestamp": 1.5,
            "symbol": "BTC-USDT",
            "trade_id": 9,
            "price": 98.0,
            "quantity": 10.0,
            "aggressor_side": "SELL",
            "maker_order_id": 1,
            "taker_order_id": 7,
            "taker_fee": 1.96,
            "maker_fee": 0.98
        }))
        .unwrap();
        assert_eq!(report.engine_latency_ns, None);

        report.engine_latency_ns = Some(1234);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["engine_latency_ns"], 1234);
    }
}
