use rackwise_inventory::InventoryClient;
use rackwise_placement::{BatchPlacer, RackDistributionWeigher};
use rackwise_state::StateStore;
use rackwise_topology::instance_name;
use serde::Serialize;
use tracing::warn;

use super::{RequestArgs, candidates};

#[derive(Debug, Serialize)]
pub struct PlannedInstance {
    pub host_id: String,
    pub rack: Option<String>,
    pub weight: f64,
    /// Name the instance takes on this node, when the node name allows it.
    pub instance_name: Option<String>,
}

/// Pick hosts for `count` instances described by `request`.
pub fn place(
    store: &StateStore,
    inventory: &dyn InventoryClient,
    request: &RequestArgs,
    host_ids: &[String],
    count: usize,
) -> anyhow::Result<Vec<PlannedInstance>> {
    let hosts = candidates(inventory, host_ids)?;
    let mut ctx = request.context();
    let placer = BatchPlacer::new(RackDistributionWeigher::new(store));
    let picks = placer.place(&hosts, &mut ctx, count)?;

    picks
        .into_iter()
        .map(|pick| -> anyhow::Result<PlannedInstance> {
            let node = inventory.get_node(&pick.host_id)?;
            let name = match instance_name(&node.name, &request.role) {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!(host = %pick.host_id, error = %e, "no instance name for node");
                    None
                }
            };
            Ok(PlannedInstance {
                host_id: pick.host_id,
                rack: pick.rack,
                weight: pick.weight,
                instance_name: name,
            })
        })
        .collect()
}
