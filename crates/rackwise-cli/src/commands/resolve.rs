use rackwise_core::RackwiseConfig;
use rackwise_inventory::InventoryClient;
use rackwise_topology::{NodeTopology, TopologyResolver};
use tracing::warn;

/// Address `node_id` should use on `network`.
///
/// Also checks the node's registered ports against its declared topology
/// and warns about any port the topology does not know.
pub fn resolve(
    inventory: &dyn InventoryClient,
    config: &RackwiseConfig,
    node_id: &str,
    network: &str,
) -> anyhow::Result<String> {
    let node = inventory.get_node(node_id)?;
    let topology = NodeTopology::from_node(&node)?;
    let resolver = TopologyResolver::new(&config.topology.tag2net);

    for port in inventory.list_ports(node_id)? {
        if !resolver.contains(&topology, &port.address) {
            warn!(
                node = %node_id,
                port = %port.uuid,
                address = %port.address,
                "registered port is not part of the declared topology"
            );
        }
    }

    Ok(resolver.resolve(&topology, network)?.to_string())
}
