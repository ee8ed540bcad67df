//! Error types for the rackwise inventory store.

use rackwise_core::ErrorKind;
use thiserror::Error;

/// Result of an inventory store operation.
pub type StateResult<T> = Result<T, StateError>;

/// Failures of the embedded inventory store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open inventory store: {0}")]
    Open(String),

    #[error("store transaction failed: {0}")]
    Transaction(String),

    #[error("store table unavailable: {0}")]
    Table(String),

    #[error("store read failed: {0}")]
    Read(String),

    #[error("store write failed: {0}")]
    Write(String),

    #[error("record encoding failed: {0}")]
    Serialize(String),

    #[error("record decoding failed: {0}")]
    Deserialize(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

impl StateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Upstream,
        }
    }
}
