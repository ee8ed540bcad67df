pub mod import;
pub mod nodes;
pub mod place;
pub mod resolve;
pub mod weigh;

use clap::Args;
use rackwise_core::RackwiseConfig;
use rackwise_inventory::{FilteredClient, InventoryClient, InventoryFilter};
use rackwise_placement::{HostCandidate, WeighContext, host_from_node};
use rackwise_state::StateStore;
use tracing::info;

/// What is being scheduled.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Project the instances belong to.
    #[arg(long)]
    pub project: String,
    /// Instance role; occupancy is counted per (project, role).
    #[arg(long)]
    pub role: String,
    /// Workload class marker (e.g. the flavor sku). Without it every
    /// host weighs the same.
    #[arg(long)]
    pub workload_class: Option<String>,
    /// Host already picked in this pass, as `<host>=<rack>` (repeatable).
    #[arg(long = "reserve", value_parser = parse_reservation)]
    pub reservations: Vec<(String, String)>,
}

impl RequestArgs {
    pub fn context(&self) -> WeighContext {
        let mut ctx = WeighContext::new(self.project.as_str(), self.role.as_str());
        ctx.workload_class = self.workload_class.clone();
        for (host, rack) in &self.reservations {
            ctx.reservations.reserve(host.as_str(), rack.as_str());
        }
        ctx
    }
}

fn parse_reservation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((host, rack)) if !host.is_empty() && !rack.is_empty() => {
            Ok((host.to_string(), rack.to_string()))
        }
        _ => Err(format!("expected <host>=<rack>, got {raw:?}")),
    }
}

/// The node inventory as configured: filtered when the filter is enabled.
pub fn inventory<'a>(
    store: &'a StateStore,
    config: &RackwiseConfig,
) -> anyhow::Result<Box<dyn InventoryClient + 'a>> {
    match InventoryFilter::from_config(&config.inventory_filter)? {
        Some(filter) => {
            info!(path = %filter.path(), pattern = filter.pattern(), "inventory filter enabled");
            Ok(Box::new(FilteredClient::new(store, filter)))
        }
        None => Ok(Box::new(store)),
    }
}

/// Host candidates for the given node ids, or every listed node.
pub fn candidates(
    inventory: &dyn InventoryClient,
    host_ids: &[String],
) -> anyhow::Result<Vec<HostCandidate>> {
    let nodes = if host_ids.is_empty() {
        inventory.list_nodes()?
    } else {
        host_ids
            .iter()
            .map(|id| inventory.get_node(id))
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(nodes.iter().map(host_from_node).collect())
}

#[cfg(test)]
pub(crate) mod testing {
    use rackwise_state::{InstanceRecord, NodeRecord, StateStore, VmState};
    use serde_json::json;
    use std::collections::HashMap;

    pub fn node(uuid: &str, rack: &str, pool: &str) -> NodeRecord {
        let mut node = NodeRecord::new(uuid, format!("b-spare-r01{rack}-prod"));
        node.properties.insert("rack".to_string(), json!(rack));
        node.extra.insert("pool".to_string(), json!(pool));
        node.extra.insert(
            "network".to_string(),
            json!({
                "bond0": {"type": "bond", "interfaces": ["p1p1", "p2p1"]},
                "mgmt": {"type": "symlink", "interfaces": ["em1"], "vlan": 101},
                "bond0.103": {"type": "tagged", "interfaces": ["bond0"], "vlan": "103"}
            }),
        );
        node.extra.insert(
            "interfaces".to_string(),
            json!({
                "em1": format!("{uuid}:em1"),
                "p1p1": format!("{uuid}:p1p1"),
                "p2p1": format!("{uuid}:p2p1")
            }),
        );
        node
    }

    pub fn web(uuid: &str, rack: &str) -> InstanceRecord {
        InstanceRecord {
            uuid: uuid.to_string(),
            project_id: "p1".to_string(),
            hostname: format!("web-{uuid}-prod"),
            node_uuid: None,
            vm_state: VmState::Active,
            deleted: false,
            metadata: HashMap::from([
                ("role".to_string(), "web".to_string()),
                ("rack".to_string(), rack.to_string()),
            ]),
        }
    }

    /// Four nodes over racks a, a, b, c; two `web` instances in a.
    pub fn store() -> StateStore {
        let store = StateStore::open_in_memory().unwrap();
        store.put_node(&node("n-a1", "a", "cpe-east")).unwrap();
        store.put_node(&node("n-a2", "a", "cpe-east")).unwrap();
        store.put_node(&node("n-b1", "b", "batch")).unwrap();
        store.put_node(&node("n-c1", "c", "cpe-west")).unwrap();
        store.put_instance(&web("i-1", "a")).unwrap();
        store.put_instance(&web("i-2", "a")).unwrap();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reservations() {
        assert_eq!(
            parse_reservation("n-a1=a").unwrap(),
            ("n-a1".to_string(), "a".to_string())
        );
        assert!(parse_reservation("n-a1").is_err());
        assert!(parse_reservation("=a").is_err());
        assert!(parse_reservation("n-a1=").is_err());
    }

    #[test]
    fn request_args_build_context() {
        let args = RequestArgs {
            project: "p1".to_string(),
            role: "web".to_string(),
            workload_class: Some("bm.large".to_string()),
            reservations: vec![("n-b1".to_string(), "b".to_string())],
        };
        let ctx = args.context();
        assert!(ctx.is_bare_metal());
        assert_eq!(ctx.reservations.racks().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn configured_filter_applies_to_candidates() {
        let store = testing::store();
        let mut config = RackwiseConfig::default();
        config.inventory_filter.enabled = true;
        config.inventory_filter.key = Some("extra.pool".to_string());
        config.inventory_filter.value = Some("^cpe-".to_string());

        let inventory = inventory(&store, &config).unwrap();
        let hosts = candidates(inventory.as_ref(), &[]).unwrap();
        let ids: Vec<&str> = hosts.iter().map(|h| h.host_id.as_str()).collect();
        assert_eq!(ids, ["n-a1", "n-a2", "n-c1"]);
    }

    #[test]
    fn explicit_hosts_bypass_listing() {
        let store = testing::store();
        let inventory = inventory(&store, &RackwiseConfig::default()).unwrap();
        let hosts = candidates(inventory.as_ref(), &["n-b1".to_string()]).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].rack.as_deref(), Some("b"));
    }
}
