//! Error types for AquaSync core.

use crate::types::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core store and ledger operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record was looked up by id but does not exist.
    #[error("record not found: {id} in {kind}")]
    NotFound {
        /// The entity kind searched.
        kind: EntityKind,
        /// The record id that was not found.
        id: Uuid,
    },

    /// A wire entity name did not match any known kind.
    #[error("unknown entity kind: {0:?}")]
    UnknownKind(String),

    /// The settings store rejected a read or write.
    #[error("settings error: {0}")]
    Settings(String),

    /// The backing store rejected an operation.
    #[error("store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::UnknownKind("widgets".into());
        assert!(err.to_string().contains("widgets"));

        let err = CoreError::NotFound {
            kind: EntityKind::Client,
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("clients"));
    }
}
