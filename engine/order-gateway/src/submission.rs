//! The order-submission channel: parse, validate, assign an id, enqueue.
//!
//! Every inbound frame gets exactly one reply. ACCEPTED acknowledges the
//! enqueue only; matching happens later on the engine loop, and whatever
//! it decides (including a FOK rejection) produces no further frame here.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use gavel::{Order, OrderIdAllocator, OrderType, PriceScale};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info};

use crate::error::GatewayResult;
use crate::messages::{SubmitRequest, SubmitResponse};

/// Arrival stamp for audit fields; never used for priority.
fn now_ns() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// Accepts submission connections and turns valid frames into engine-queue
/// entries. Ids are taken from the shared allocator so the reply can carry
/// them before the order is matched.
pub struct SubmissionChannel {
    scale: PriceScale,
    allocator: Arc<OrderIdAllocator>,
    engine_tx: mpsc::UnboundedSender<Order>,
}

impl SubmissionChannel {
    pub fn new(
        scale: PriceScale,
        allocator: Arc<OrderIdAllocator>,
        engine_tx: mpsc::UnboundedSender<Order>,
    ) -> Self {
        Self { scale, allocator, engine_tx }
    }

    pub async fn run(self: Arc<Self>, listener: TcpListener) -> GatewayResult<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let channel = self.clone();
                    tokio::spawn(async move { channel.handle_connection(stream, peer).await });
                }
                Err(e) => error!("submission accept failed: {e}"),
            }
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let ws = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                debug!(%peer, "submission handshake failed: {e}");
                return;
            }
        };
        info!(%peer, "submission client connected");
        let (mut sink, mut frames) = ws.split();

        while let Some(frame) = frames.next().await {
            let reply = match frame {
                Ok(WsMessage::Text(text)) => self.handle_frame(&text),
                Ok(WsMessage::Ping(payload)) => {
                    let _ = sink.send(WsMessage::Pong(payload)).await;
                    continue;
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => continue,
            };
            let encoded = match serde_json::to_string(&reply) {
                Ok(encoded) => encoded,
                Err(e) => {
                    error!("failed to encode submission reply: {e}");
                    continue;
                }
            };
            if sink.send(WsMessage::Text(encoded)).await.is_err() {
                break;
            }
        }
        info!(%peer, "submission client disconnected");
    }

    /// One frame in, one reply out. Parse failures are ERROR; validation
    /// failures are REJECTED; a successful enqueue is ACCEPTED with the
    /// assigned id.
    pub fn handle_frame(&self, text: &str) -> SubmitResponse {
        let request: SubmitRequest = match serde_json::from_str(text) {
            Ok(request) => request,
            Err(e) => return SubmitResponse::Error { reason: format!("invalid submission: {e}") },
        };
        let order = match self.build_order(request) {
            Ok(order) => order,
            Err(reason) => return SubmitResponse::Rejected { reason },
        };
        let order_id = order.order_id;
        match self.engine_tx.send(order) {
            Ok(()) => SubmitResponse::Accepted { order_id },
            Err(_) => SubmitResponse::Error { reason: "engine queue closed".into() },
        }
    }

    fn build_order(&self, request: SubmitRequest) -> Result<Order, String> {
        let user_id = request.user_id.ok_or("missing required field: user_id")?;
        let order_type = request.order_type.ok_or("missing required field: order_type")?;
        let side = request.side.ok_or("missing required field: side")?;
        let quantity = request.quantity.ok_or("missing required field: quantity")?;

        let limit_price = match (order_type, request.price) {
            // MARKET matches at any price; a submitted price is ignored
            (OrderType::Market, _) => None,
            (_, None) => return Err("missing required field: price".into()),
            (_, Some(price)) => Some(self.scale.price_ticks(price).map_err(|e| e.to_string())?),
        };
        let quantity = self.scale.qty_lots(quantity).map_err(|e| e.to_string())?;

        Ok(Order::new(
            self.allocator.allocate(),
            user_id,
            side,
            order_type,
            limit_price,
            quantity,
            now_ns(),
        ))
    }
}
