//! Subscriber fan-out for the push channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Fans text frames out to every connected subscriber. Sends go through
/// per-connection unbounded channels, so a slow client never blocks the
/// publisher; a subscriber whose channel is gone is pruned on the first
/// failed send. With `replay_latest`, the most recent frame is cached and
/// handed to each new subscriber on connect (the market-data contract).
pub struct Broadcaster {
    subscribers: RwLock<HashMap<u64, mpsc::UnboundedSender<Message>>>,
    latest: RwLock<Option<String>>,
    next_id: AtomicU64,
    replay_latest: bool,
}

impl Broadcaster {
    pub fn new(replay_latest: bool) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            latest: RwLock::new(None),
            next_id: AtomicU64::new(1),
            replay_latest,
        }
    }

    /// Register a subscriber and replay the cached frame if this feed
    /// keeps one. Returns the id to pass to [`Broadcaster::unsubscribe`].
    pub async fn subscribe(&self, sender: mpsc::UnboundedSender<Message>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().await.insert(id, sender.clone());
        if self.replay_latest {
            if let Some(frame) = self.latest.read().await.clone() {
                let _ = sender.send(Message::Text(frame));
            }
        }
        id
    }

    pub async fn unsubscribe(&self, id: u64) {
        self.subscribers.write().await.remove(&id);
    }

    /// Push one frame to every subscriber, dropping the ones that are gone.
    pub async fn publish(&self, frame: String) {
        if self.replay_latest {
            *self.latest.write().await = Some(frame.clone());
        }

        let mut dead = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            if subscribers.is_empty() {
                return;
            }
            for (&id, sender) in subscribers.iter() {
                if sender.send(Message::Text(frame.clone())).is_err() {
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in dead {
                subscribers.remove(&id);
                debug!(subscriber = id, "dropped dead feed subscriber");
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
