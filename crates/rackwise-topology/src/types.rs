//! Node interface topology.
//!
//! The inventory stores a node's wiring under `extra.network` as a mapping
//! of group name → `{type, vlan, interfaces}`, and the physical port
//! addresses under `extra.interfaces`. For example:
//!
//! ```json
//! {
//!   "network": {
//!     "bond0":     {"type": "bond",    "interfaces": ["p1p1", "p2p1"]},
//!     "mgmt":      {"type": "symlink", "interfaces": ["em1"], "vlan": 101},
//!     "bond0.103": {"type": "tagged",  "interfaces": ["bond0"], "vlan": 103}
//!   },
//!   "interfaces": {"em1": "52:54:00:00:00:01", "p1p1": "52:54:00:00:00:02"}
//! }
//! ```
//!
//! Loading turns that into a validated [`NodeTopology`]: every group's
//! first member points at something that exists, and a tagged group sits
//! directly on a bond or alias.

use std::collections::BTreeMap;

use rackwise_core::NodeId;
use rackwise_state::NodeRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TopologyError, TopologyResult};

/// How an interface group maps onto physical ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Aggregate of physical ports; addressed by its first member.
    #[serde(rename = "bonded", alias = "bond")]
    Bonded,
    /// VLAN sub-interface on a carrier group.
    #[serde(rename = "tagged")]
    Tagged,
    /// Another name for a single physical port.
    #[serde(rename = "aliased", alias = "symlink")]
    Aliased,
}

/// One named entry of a node's topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceGroup {
    pub name: String,
    pub kind: InterfaceKind,
    /// VLAN tag, normalized to its string form.
    pub vlan: Option<String>,
    /// Physical port names (bonded/aliased) or the carrier group (tagged).
    pub members: Vec<String>,
}

impl InterfaceGroup {
    pub fn new(name: impl Into<String>, kind: InterfaceKind, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind,
            vlan: None,
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_vlan(self, vlan: impl ToString) -> Self {
        Self {
            vlan: Some(vlan.to_string()),
            ..self
        }
    }

    fn first_member(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }
}

/// Wire shape of one `extra.network` entry.
#[derive(Deserialize)]
struct GroupDecl {
    #[serde(rename = "type")]
    kind: InterfaceKind,
    #[serde(default)]
    vlan: Option<VlanDecl>,
    #[serde(default)]
    interfaces: Vec<String>,
}

/// VLAN tags show up both as numbers and as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum VlanDecl {
    Number(u64),
    Text(String),
}

impl VlanDecl {
    fn normalize(self) -> Option<String> {
        match self {
            VlanDecl::Number(n) => Some(n.to_string()),
            VlanDecl::Text(s) if s.is_empty() => None,
            VlanDecl::Text(s) => Some(s),
        }
    }
}

/// Validated interface topology of one node.
///
/// Built fresh for every resolution request and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTopology {
    node_id: NodeId,
    groups: Vec<InterfaceGroup>,
    interfaces: BTreeMap<String, String>,
}

impl NodeTopology {
    /// Build a topology from groups in declaration order and the physical
    /// port → address map, rejecting references that cannot resolve.
    pub fn new(
        node_id: impl Into<NodeId>,
        groups: Vec<InterfaceGroup>,
        interfaces: BTreeMap<String, String>,
    ) -> TopologyResult<Self> {
        let topology = Self {
            node_id: node_id.into(),
            groups,
            interfaces,
        };
        topology.validate()?;
        Ok(topology)
    }

    /// Load the topology declared in a node record's `extra.network` and
    /// `extra.interfaces`.
    pub fn from_node(node: &NodeRecord) -> TopologyResult<Self> {
        let network = node
            .extra
            .get("network")
            .and_then(Value::as_object)
            .ok_or_else(|| TopologyError::invalid(&node.uuid, "extra.network is not a mapping"))?;
        let interfaces = node
            .extra
            .get("interfaces")
            .ok_or_else(|| TopologyError::invalid(&node.uuid, "extra.interfaces is missing"))?;
        let interfaces: BTreeMap<String, String> = serde_json::from_value(interfaces.clone())
            .map_err(|e| TopologyError::invalid(&node.uuid, format!("extra.interfaces: {e}")))?;

        let mut groups = Vec::with_capacity(network.len());
        for (name, decl) in network {
            let decl: GroupDecl = serde_json::from_value(decl.clone()).map_err(|e| {
                TopologyError::invalid(&node.uuid, format!("group {name}: {e}"))
            })?;
            groups.push(InterfaceGroup {
                name: name.clone(),
                kind: decl.kind,
                vlan: decl.vlan.and_then(VlanDecl::normalize),
                members: decl.interfaces,
            });
        }

        Self::new(node.uuid.clone(), groups, interfaces)
    }

    fn validate(&self) -> TopologyResult<()> {
        for (index, group) in self.groups.iter().enumerate() {
            if self.groups[..index].iter().any(|g| g.name == group.name) {
                return Err(TopologyError::invalid(
                    &self.node_id,
                    format!("group {} declared twice", group.name),
                ));
            }
            let Some(first) = group.first_member() else {
                return Err(TopologyError::invalid(
                    &self.node_id,
                    format!("group {} has no members", group.name),
                ));
            };
            match group.kind {
                InterfaceKind::Bonded | InterfaceKind::Aliased => {
                    if !self.interfaces.contains_key(first) {
                        return Err(TopologyError::invalid(
                            &self.node_id,
                            format!("group {} references unknown interface {first}", group.name),
                        ));
                    }
                }
                InterfaceKind::Tagged => {
                    self.carrier_of(group)?;
                }
            }
        }
        Ok(())
    }

    /// Carrier group of a tagged group. Only one level of tagging is
    /// supported: a tagged carrier is rejected.
    pub(crate) fn carrier_of(&self, group: &InterfaceGroup) -> TopologyResult<&InterfaceGroup> {
        let carrier_name = group.first_member().unwrap_or_default();
        let carrier = self.group(carrier_name).ok_or_else(|| {
            TopologyError::invalid(
                &self.node_id,
                format!("tagged group {} references unknown carrier {carrier_name}", group.name),
            )
        })?;
        if carrier.kind == InterfaceKind::Tagged {
            return Err(TopologyError::invalid(
                &self.node_id,
                format!("tagged group {} sits on tagged carrier {}", group.name, carrier.name),
            ));
        }
        Ok(carrier)
    }

    /// Address of the physical port backing `group`.
    pub fn address_for(&self, group: &InterfaceGroup) -> TopologyResult<&str> {
        let port_group = match group.kind {
            InterfaceKind::Bonded | InterfaceKind::Aliased => group,
            InterfaceKind::Tagged => self.carrier_of(group)?,
        };
        let port = port_group.first_member().unwrap_or_default();
        self.address_of(port).ok_or_else(|| {
            TopologyError::invalid(
                &self.node_id,
                format!("group {} references unknown interface {port}", port_group.name),
            )
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[InterfaceGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&InterfaceGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Address of a physical port by name.
    pub fn address_of(&self, interface: &str) -> Option<&str> {
        self.interfaces.get(interface).map(String::as_str)
    }

    /// Whether `address` belongs to any physical port of this node.
    pub fn contains(&self, address: &str) -> bool {
        self.interfaces.values().any(|a| a == address)
    }
}
