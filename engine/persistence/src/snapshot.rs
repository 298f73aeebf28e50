//! Snapshot of the full engine state, written after every processed order.
//!
//! The write is atomic with respect to crashes: the snapshot is serialized
//! to a temporary file in the destination directory, fsynced, and renamed
//! over the target. A partially written file is never observable under the
//! snapshot path.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gavel::{OrderBook, OrderId};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{PersistenceError, Result};

/// Current snapshot format version. Bumped on any incompatible change to
/// the serialized shape; loading a mismatched version is a corruption
/// error, never a silent reinterpretation.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume the engine: both sides of the book with
/// per-order FIFO ordering, the locator map, and both identifier
/// high-water marks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub version: u32,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Next order id the allocator would hand out.
    pub next_order_id: OrderId,
    pub book: OrderBook,
}

impl BookSnapshot {
    pub fn capture(book: &OrderBook, next_order_id: OrderId) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            next_order_id,
            book: book.clone(),
        }
    }
}

/// Owns the snapshot file path. Accessed only from the engine loop.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably replace the snapshot: temp file in the target directory,
    /// fsync, atomic rename.
    pub fn save(&self, snapshot: &BookSnapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, snapshot)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PersistenceError::Io(e.error))?;
        tracing::trace!(path = %self.path.display(), id = %snapshot.id, "snapshot written");
        Ok(())
    }

    /// Load the snapshot if one exists; `Ok(None)` means a fresh start.
    /// The recovered book is validated before it is handed back, and both
    /// counters must clear every persisted identifier.
    pub fn load(&self) -> Result<Option<BookSnapshot>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: BookSnapshot = serde_json::from_reader(BufReader::new(file))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::corruption(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        snapshot.book.validate().map_err(|e| PersistenceError::corruption(e.to_string()))?;
        if let Some(max_id) = snapshot.book.max_resting_order_id() {
            if snapshot.next_order_id <= max_id {
                return Err(PersistenceError::corruption(format!(
                    "order counter {} does not clear resting order {}",
                    snapshot.next_order_id, max_id
                )));
            }
        }
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel::{
        EngineCfg, FeeSchedule, Gavel, Order, OrderType, PriceScale, Qty, Side,
    };
    use rust_decimal::Decimal;

    fn unit_cfg() -> EngineCfg {
        EngineCfg {
            symbol: "BTC-USDT".into(),
            scale: PriceScale::new(Decimal::ONE, Decimal::ONE),
            fees: FeeSchedule::default(),
            depth: 10,
        }
    }

    fn limit(id: OrderId, side: Side, price: u64, qty: Qty) -> Order {
        Order::new(id, 7, side, OrderType::Limit, Some(price), qty, 0)
    }

    /// Scenario A book: bids {98:10, 95:15}, asks {104:20, 105:10}.
    fn scenario_a_engine() -> Gavel {
        let mut engine = Gavel::new(unit_cfg());
        for order in [
            limit(1, Side::Buy, 98, 10),
            limit(2, Side::Buy, 95, 15),
            limit(3, Side::Sell, 104, 20),
            limit(4, Side::Sell, 105, 10),
        ] {
            assert!(engine.process_order(order).is_empty());
        }
        engine
    }

    fn store_in(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("gavel.snapshot"))
    }

    #[test]
    fn missing_file_means_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn snapshot_round_trips_the_whole_book() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let engine = scenario_a_engine();

        store.save(&BookSnapshot::capture(engine.book(), 5)).unwrap();
        let restored = store.load().unwrap().unwrap();

        assert_eq!(restored.version, SNAPSHOT_VERSION);
        assert_eq!(restored.next_order_id, 5);
        assert_eq!(restored.book.symbol(), "BTC-USDT");
        assert_eq!(restored.book.best_bid_offer(), (Some(98), Some(104)));
        assert_eq!(restored.book.depth(Side::Buy, 10), engine.book().depth(Side::Buy, 10));
        assert_eq!(restored.book.depth(Side::Sell, 10), engine.book().depth(Side::Sell, 10));
        assert_eq!(restored.book.next_trade_id(), engine.book().next_trade_id());
        restored.book.validate().unwrap();
    }

    #[test]
    fn restart_preserves_fifo_head_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        // scenario F: snapshot after A, discard, reload, market sell 10
        let engine = scenario_a_engine();
        store.save(&BookSnapshot::capture(engine.book(), 5)).unwrap();
        drop(engine);

        let snapshot = store.load().unwrap().unwrap();
        let mut engine = Gavel::with_book(unit_cfg(), snapshot.book);
        let trades =
            engine.process_order(Order::new(5, 9, Side::Sell, OrderType::Market, None, 10, 0));

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Decimal::from(98));
        assert_eq!(trades[0].maker_order_id, 1);
        assert_eq!(trades[0].trade_id, 1);
        assert_eq!(engine.book().depth(Side::Buy, 10), vec![(95, 15)]);
        engine.book().validate().unwrap();
    }

    #[test]
    fn save_replaces_previous_snapshot_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut engine = scenario_a_engine();

        store.save(&BookSnapshot::capture(engine.book(), 5)).unwrap();
        engine.process_order(Order::new(5, 9, Side::Buy, OrderType::Market, None, 30, 0));
        store.save(&BookSnapshot::capture(engine.book(), 6)).unwrap();

        // the newest state wins and no temp files linger
        let restored = store.load().unwrap().unwrap();
        assert_eq!(restored.book.best_bid_offer(), (Some(98), None));
        assert_eq!(restored.next_order_id, 6);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn truncated_file_is_reported_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{\"version\":1,\"id\":").unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Serialization(_))));
    }

    #[test]
    fn version_mismatch_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let engine = scenario_a_engine();

        let mut snapshot = BookSnapshot::capture(engine.book(), 5);
        snapshot.version = 99;
        store.save(&snapshot).unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Corruption(_))));
    }

    #[test]
    fn stale_order_counter_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let engine = scenario_a_engine();

        // book holds order ids up to 4; a counter of 3 could reissue them
        store.save(&BookSnapshot::capture(engine.book(), 3)).unwrap();
        assert!(matches!(store.load(), Err(PersistenceError::Corruption(_))));
    }
}
