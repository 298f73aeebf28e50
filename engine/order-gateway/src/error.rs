//! Error types for the OrderGateway

use thiserror::Error;

/// Errors that can occur in the OrderGateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine queue closed")]
    QueueClosed,
}

/// Result type for OrderGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
