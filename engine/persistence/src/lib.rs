//! # Persistence Layer
//!
//! Durable recovery state for the matching engine: a single versioned
//! snapshot file holding the full order book and both identifier
//! counters, rewritten atomically after every processed order.
//!
//! Startup loads the snapshot if present and validates every book
//! invariant before the engine resumes; a missing file means an empty
//! book. Runtime write failures are fatal by design: an engine that
//! cannot persist must stop accepting work.

pub mod config;
pub mod error;
pub mod snapshot;

pub use config::PersistenceConfig;
pub use error::{PersistenceError, Result};
pub use snapshot::{BookSnapshot, SnapshotStore, SNAPSHOT_VERSION};
