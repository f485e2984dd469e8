//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Sync failures never mutate local state: a record stays dirty until a
/// push response confirms it, and the watermark stays put until a pull
/// has been fully applied.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No credentials available; nothing was sent to the server.
    #[error("not authenticated: no access token available")]
    AuthMissing,

    /// The server rejected the credentials (HTTP 401).
    #[error("authentication rejected: {0}")]
    AuthInvalid(String),

    /// The account lacks permission for the operation (HTTP 403).
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The server answered with a non-auth error status.
    #[error("server error: status {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// A response could not be parsed against the wire contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local storage error during sync.
    #[error("store error: {0}")]
    Store(#[from] aquasync_core::CoreError),

    /// Sync was cancelled.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<aquasync_protocol::ProtocolError> for SyncError {
    fn from(err: aquasync_protocol::ProtocolError) -> Self {
        SyncError::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection lost").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Server {
            status: 503,
            body: "unavailable".into()
        }
        .is_retryable());
        assert!(!SyncError::Server {
            status: 422,
            body: "validation".into()
        }
        .is_retryable());
        assert!(!SyncError::AuthInvalid("expired".into()).is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::AuthMissing;
        assert!(err.to_string().contains("not authenticated"));

        let err = SyncError::Server {
            status: 500,
            body: "boom".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }
}
