//! Push-only feed endpoints (market data and trade reports).
//!
//! Subscribers receive whatever the engine loop publishes, in publication
//! order. Inbound frames are drained and ignored apart from pings and
//! close; a disconnecting client only ever unhooks itself.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info};

use crate::broadcaster::Broadcaster;
use crate::error::GatewayResult;

pub struct FeedChannel {
    name: &'static str,
    broadcaster: Arc<Broadcaster>,
}

impl FeedChannel {
    pub fn new(name: &'static str, broadcaster: Arc<Broadcaster>) -> Self {
        Self { name, broadcaster }
    }

    pub async fn run(self, listener: TcpListener) -> GatewayResult<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let broadcaster = self.broadcaster.clone();
                    let name = self.name;
                    tokio::spawn(async move {
                        handle_subscriber(name, broadcaster, stream, peer).await;
                    });
                }
                Err(e) => error!("{} accept failed: {e}", self.name),
            }
        }
    }
}

async fn handle_subscriber(
    name: &'static str,
    broadcaster: Arc<Broadcaster>,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!(%peer, "{name} handshake failed: {e}");
            return;
        }
    };
    info!(%peer, "{name} subscriber connected");
    let (mut sink, mut frames) = ws.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = broadcaster.subscribe(tx).await;

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(message) => {
                    if sink.send(message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = frames.next() => match inbound {
                Some(Ok(WsMessage::Ping(payload))) => {
                    let _ = sink.send(WsMessage::Pong(payload)).await;
                }
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    broadcaster.unsubscribe(id).await;
    info!(%peer, "{name} subscriber disconnected");
}
