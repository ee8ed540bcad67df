//! Instance naming derived from the node an instance lands on.
//!
//! Node names encode their physical position:
//! `<prefix>-<anything>-<rack-position>-<env>`, e.g. `b-spare-r01a10-prod`.
//! An instance placed on that node keeps the prefix, position and
//! environment and swaps the middle for its role: `b-web-r01a10-prod`.

use std::collections::HashMap;

use rackwise_state::NodeRecord;
use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};

/// Network whose FQDN uses the environment encoded in the hostname.
pub const PROD_NETWORK: &str = "prod";

/// RAID layout used when the instance does not ask for one.
pub const DEFAULT_RAID: &str = "jbod";

/// Instance name for `role` on the node called `node_name`.
pub fn instance_name(node_name: &str, role: &str) -> TopologyResult<String> {
    let parts: Vec<&str> = node_name.split('-').collect();
    if parts.len() < 3 {
        return Err(TopologyError::MalformedNodeName(node_name.to_string()));
    }
    let tail = &parts[parts.len() - 2..];
    Ok(format!("{}-{role}-{}-{}", parts[0], tail[0], tail[1]))
}

/// Properties recorded on an instance once its node is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceProperties {
    pub rack: String,
    pub dns_zone: String,
    pub dns_domain: String,
    pub role: String,
    pub cluster: String,
    pub raid: String,
}

impl InstanceProperties {
    /// Derive properties from the chosen node and the instance request.
    ///
    /// `role` falls back to the hostname, `cluster` to the project name,
    /// `raid` to [`DEFAULT_RAID`].
    pub fn for_node(
        node: &NodeRecord,
        metadata: &HashMap<String, String>,
        hostname: &str,
        project_name: &str,
    ) -> TopologyResult<Self> {
        let rack = node.rack().ok_or_else(|| TopologyError::MissingField {
            node_id: node.uuid.clone(),
            field: "properties.rack",
        })?;
        let zone = node.dns_zone().ok_or_else(|| TopologyError::MissingField {
            node_id: node.uuid.clone(),
            field: "extra.dns_zone",
        })?;
        let pick = |key: &str, fallback: &str| {
            metadata
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        Ok(Self {
            rack: rack.to_string(),
            dns_zone: zone.to_string(),
            dns_domain: zone.to_string(),
            role: pick("role", hostname),
            cluster: pick("cluster", project_name),
            raid: pick("raid", DEFAULT_RAID),
        })
    }

    pub fn into_metadata(self) -> HashMap<String, String> {
        HashMap::from([
            ("rack".to_string(), self.rack),
            ("dns_zone".to_string(), self.dns_zone),
            ("dns_domain".to_string(), self.dns_domain),
            ("role".to_string(), self.role),
            ("cluster".to_string(), self.cluster),
            ("raid".to_string(), self.raid),
        ])
    }
}

/// FQDN an instance registers for an address on `network`.
///
/// The hostname's last `-` segment is its environment. Production
/// addresses keep it; every other network replaces it with the network
/// name, so `web01-prod` on `mgmt` becomes `web01-mgmt.<domain>`.
pub fn host_fqdn(hostname: &str, network: &str, dns_domain: &str) -> String {
    let (base, env) = hostname.rsplit_once('-').unwrap_or((hostname, hostname));
    let environment = if network == PROD_NETWORK { env } else { network };
    format!("{base}-{environment}.{dns_domain}")
}
