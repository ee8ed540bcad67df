//! Record types for the rackwise inventory store.
//!
//! Node `properties` and `extra` are free-form maps: the inventory schema
//! is owned by the provisioning service, not by rackwise. Fields rackwise
//! itself depends on (`properties.rack`, `extra.network`,
//! `extra.interfaces`, `extra.dns_zone`) are read through accessors.

use rackwise_core::{NodeId, RackId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Unique identifier for a port.
pub type PortId = String;

/// Unique identifier for an instance.
pub type InstanceId = String;

// ── Node ──────────────────────────────────────────────────────────

/// A bare-metal node as recorded by the provisioning inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub uuid: NodeId,
    /// Inventory name, e.g. `b-spare-r01a10-prod`.
    pub name: String,
    /// Hardware properties; `rack` lives here.
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Deployment-specific data: network topology, DNS zone, pool tags.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            properties: Map::new(),
            extra: Map::new(),
        }
    }

    /// Rack label from `properties.rack`, if it is a string.
    pub fn rack(&self) -> Option<&str> {
        self.properties.get("rack").and_then(Value::as_str)
    }

    /// DNS zone from `extra.dns_zone`, if it is a string.
    pub fn dns_zone(&self) -> Option<&str> {
        self.extra.get("dns_zone").and_then(Value::as_str)
    }
}

// ── Port ──────────────────────────────────────────────────────────

/// A physical port registered for PXE on a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortRecord {
    pub uuid: PortId,
    pub node_uuid: NodeId,
    /// Hardware address of the port.
    pub address: String,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl PortRecord {
    /// Build the composite key for the ports table.
    pub fn table_key(&self) -> String {
        format!("{}:{}", self.node_uuid, self.uuid)
    }
}

// ── Instance ──────────────────────────────────────────────────────

/// Compute-side record of a provisioned (or provisioning) instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceRecord {
    pub uuid: InstanceId,
    pub project_id: String,
    pub hostname: String,
    /// Node the instance landed on, once scheduled.
    pub node_uuid: Option<NodeId>,
    pub vm_state: VmState,
    pub deleted: bool,
    /// Free-form metadata; the scheduler reads `role` and `rack`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InstanceRecord {
    /// Build the composite key for the instances table.
    pub fn table_key(&self) -> String {
        format!("{}:{}", self.project_id, self.uuid)
    }

    pub fn role(&self) -> Option<&str> {
        self.metadata.get("role").map(String::as_str)
    }

    pub fn rack(&self) -> Option<&RackId> {
        self.metadata.get("rack")
    }
}

/// Lifecycle state of an instance.
///
/// The compute service owns the set of states; anything rackwise does not
/// name is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VmState {
    Building,
    Active,
    Stopped,
    Error,
    Other(String),
}

impl VmState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Building => "building",
            Self::Active => "active",
            Self::Stopped => "stopped",
            Self::Error => "error",
            Self::Other(state) => state,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl From<String> for VmState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "building" => Self::Building,
            "active" => Self::Active,
            "stopped" => Self::Stopped,
            "error" => Self::Error,
            _ => Self::Other(state),
        }
    }
}

impl From<VmState> for String {
    fn from(state: VmState) -> Self {
        match state {
            VmState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

/// Query parameters for listing instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFilter {
    pub project_id: String,
    pub deleted: bool,
}

impl InstanceFilter {
    /// Live (not deleted) instances of a project.
    pub fn live(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            deleted: false,
        }
    }

    pub fn matches(&self, instance: &InstanceRecord) -> bool {
        instance.project_id == self.project_id && instance.deleted == self.deleted
    }
}
