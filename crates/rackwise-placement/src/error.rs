//! Placement error types.

use rackwise_core::{ErrorKind, HostId};
use rackwise_state::StateError;
use thiserror::Error;

/// Errors raised while weighing or placing hosts.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("host {host_id} carries no rack label")]
    MissingRack { host_id: HostId },

    #[error("instance request in project {project_id} has neither a role nor a hostname")]
    MissingRole { project_id: String },

    #[error("weigher returned {got} weights for {expected} hosts")]
    WeightCount { expected: usize, got: usize },

    #[error("instance inventory query failed: {0}")]
    Upstream(String),

    #[error("instance store error: {0}")]
    State(#[from] StateError),
}

impl PlacementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlacementError::MissingRack { .. } | PlacementError::MissingRole { .. } => {
                ErrorKind::NotFound
            }
            PlacementError::WeightCount { .. } => ErrorKind::Configuration,
            PlacementError::Upstream(_) => ErrorKind::Upstream,
            PlacementError::State(e) => e.kind(),
        }
    }
}

pub type PlacementResult<T> = Result<T, PlacementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let missing = PlacementError::MissingRack {
            host_id: "h-1".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(missing.to_string().contains("h-1"));

        let mismatch = PlacementError::WeightCount {
            expected: 2,
            got: 3,
        };
        assert_eq!(mismatch.kind(), ErrorKind::Configuration);
        assert!(!mismatch.kind().is_retryable());

        let upstream = PlacementError::Upstream("connection reset".to_string());
        assert!(upstream.kind().is_retryable());

        let store: PlacementError = StateError::Read("io".to_string()).into();
        assert_eq!(store.kind(), ErrorKind::Upstream);
    }
}
