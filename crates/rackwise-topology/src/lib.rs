//! rackwise-topology: pick the physical address for a logical network.
//!
//! A node's wiring is declared in its inventory record as named interface
//! groups (bonds, VLAN-tagged sub-interfaces on a carrier, and plain
//! aliases of one physical port) plus a map of physical port addresses.
//! Given a logical network name, the resolver walks the groups in
//! declaration order and returns the address of the first group whose
//! VLAN tag maps to that network.
//!
//! # Components
//!
//! - **`types`**: `NodeTopology`, `InterfaceGroup`, load-time validation
//! - **`resolver`**: `TopologyResolver` (first match by VLAN tag)
//! - **`naming`**: instance names, instance properties, per-network FQDNs

pub mod error;
pub mod naming;
pub mod resolver;
pub mod types;

pub use error::{TopologyError, TopologyResult};
pub use naming::{InstanceProperties, host_fqdn, instance_name};
pub use resolver::TopologyResolver;
pub use types::{InterfaceGroup, InterfaceKind, NodeTopology};
