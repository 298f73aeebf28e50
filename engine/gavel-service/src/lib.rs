//! Gavel service - the production entry point for the matching engine.
//!
//! Wires the matching core, snapshot persistence, and the WebSocket
//! gateway into a single-writer pipeline, with configuration, logging,
//! and graceful shutdown around it.

pub mod config;
pub mod engine_loop;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::{load_config, EngineSettings, LoggingConfig, ServiceConfig, ServiceSettings};
pub use engine_loop::EngineLoop;
pub use logging::initialize_logging;
pub use service::Service;
pub use signals::{graceful_shutdown, setup_signal_handlers};
