//! Protocol error type.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A payload could not be serialized or parsed as JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload parsed as JSON but violated the protocol's shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ProtocolError {
    /// Creates a malformed-payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        ProtocolError::Malformed(message.into())
    }
}
