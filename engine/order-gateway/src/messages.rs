//! Wire frames for the three channels. One JSON object per text frame;
//! decimal fields travel as JSON numbers.

use gavel::{L2Snapshot, OrderId, OrderType, Side, TradeReport};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client → server order submission. Fields are optional so that a
/// missing required field is a validation rejection, not a parse error;
/// the distinction decides between a REJECTED and an ERROR reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    pub side: Option<Side>,

    /// Required for LIMIT/IOC/FOK; ignored for MARKET.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
}

/// Server → client reply; exactly one per submission frame. ACCEPTED
/// means queued, not matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SubmitResponse {
    #[serde(rename = "ACCEPTED")]
    Accepted { order_id: OrderId },

    #[serde(rename = "REJECTED")]
    Rejected { reason: String },

    #[serde(rename = "ERROR")]
    Error { reason: String },
}

/// Server → client pushes on the market-data and trade channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedFrame {
    #[serde(rename = "L2_UPDATE")]
    L2Update(L2Snapshot),

    #[serde(rename = "TRADE_REPORT")]
    TradeReport { trades: Vec<TradeReport> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel::L2Level;
    use serde_json::json;

    #[test]
    fn submit_request_parses_the_documented_shape() {
        let request: SubmitRequest = serde_json::from_value(json!({
            "user_id": 42,
            "order_type": "LIMIT",
            "side": "BUY",
            "price": 98.5,
            "quantity": 10.0
        }))
        .unwrap();
        assert_eq!(request.user_id, Some(42));
        assert_eq!(request.order_type, Some(OrderType::Limit));
        assert_eq!(request.side, Some(Side::Buy));
        assert_eq!(request.price, Some(Decimal::new(985, 1)));
    }

    #[test]
    fn submit_request_tolerates_missing_price() {
        let request: SubmitRequest = serde_json::from_value(json!({
            "user_id": 42,
            "order_type": "MARKET",
            "side": "SELL",
            "quantity": 3.0
        }))
        .unwrap();
        assert_eq!(request.price, None);
    }

    #[test]
    fn responses_carry_the_status_tag() {
        let accepted = serde_json::to_value(SubmitResponse::Accepted { order_id: 17 }).unwrap();
        assert_eq!(accepted, json!({"status": "ACCEPTED", "order_id": 17}));

        let rejected =
            serde_json::to_value(SubmitResponse::Rejected { reason: "missing required field: quantity".into() })
                .unwrap();
        assert_eq!(rejected["status"], "REJECTED");
    }

    #[test]
    fn l2_frame_flattens_the_snapshot() {
        let frame = FeedFrame::L2Update(L2Snapshot {
            timestamp: 1.0,
            symbol: "BTC-USDT".into(),
            bids: vec![L2Level { price: Decimal::from(98), quantity: Decimal::from(10) }],
            asks: vec![],
        });
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "L2_UPDATE");
        assert_eq!(json["symbol"], "BTC-USDT");
        assert_eq!(json["bids"][0]["price"], json!(98.0));
        assert!(json["asks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn trade_frame_wraps_the_batch() {
        let frame = FeedFrame::TradeReport { trades: vec![] };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "TRADE_REPORT");
        assert!(json["trades"].as_array().unwrap().is_empty());
    }
}
