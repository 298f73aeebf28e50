//! Configuration for the persistence layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the engine's recovery state lives. The file is reserved for the
/// engine loop; nothing else reads or writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub snapshot_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { snapshot_path: PathBuf::from("./data/gavel.snapshot") }
    }
}
