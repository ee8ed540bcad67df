//! Inventory error types.

use rackwise_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur while filtering or querying the inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("invalid attribute path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("inventory filter is enabled but `{0}` is not set")]
    MissingFilterField(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response to {method}: {reason}")]
    UnexpectedResponse { method: &'static str, reason: String },

    #[error("inventory store error: {0}")]
    State(#[from] rackwise_state::StateError),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::InvalidPath { .. }
            | InventoryError::InvalidPattern { .. }
            | InventoryError::MissingFilterField(_) => ErrorKind::Configuration,
            InventoryError::NotFound(_) => ErrorKind::NotFound,
            InventoryError::UnexpectedResponse { .. } => ErrorKind::Upstream,
            InventoryError::State(e) => e.kind(),
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
