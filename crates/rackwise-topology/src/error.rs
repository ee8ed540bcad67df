//! Topology error types.

use rackwise_core::ErrorKind;
use thiserror::Error;

/// Errors raised while loading or resolving a node topology.
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("node {node_id}: no interface group serves network {network}")]
    NoMatchingGroup { node_id: String, network: String },

    #[error("node {node_id}: group {group} carries VLAN {tag} which has no network mapping")]
    UnmappedVlanTag {
        node_id: String,
        group: String,
        tag: String,
    },

    #[error("node {node_id}: invalid topology: {reason}")]
    InvalidTopology { node_id: String, reason: String },

    #[error("node {node_id}: missing {field}")]
    MissingField {
        node_id: String,
        field: &'static str,
    },

    #[error("node name {0} does not follow <prefix>-<name>-<rack>-<env>")]
    MalformedNodeName(String),
}

impl TopologyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TopologyError::NoMatchingGroup { .. } | TopologyError::MissingField { .. } => {
                ErrorKind::NotFound
            }
            TopologyError::UnmappedVlanTag { .. }
            | TopologyError::InvalidTopology { .. }
            | TopologyError::MalformedNodeName(_) => ErrorKind::Configuration,
        }
    }

    pub(crate) fn invalid(node_id: &str, reason: impl Into<String>) -> Self {
        TopologyError::InvalidTopology {
            node_id: node_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type TopologyResult<T> = Result<T, TopologyError>;
