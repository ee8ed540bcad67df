use rackwise_inventory::{InventoryCall, InventoryClient};
use serde_json::Value;

/// Detailed node listing.
pub fn list(inventory: &dyn InventoryClient) -> anyhow::Result<Value> {
    Ok(inventory.call(InventoryCall::ListNodes { detail: true })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{inventory, testing};
    use rackwise_core::RackwiseConfig;

    #[test]
    fn lists_every_node_without_filter() {
        let store = testing::store();
        let nodes = list(&store).unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 4);
        assert_eq!(nodes[0]["extra"]["pool"], "cpe-east");
    }

    #[test]
    fn lists_filtered_nodes() {
        let store = testing::store();
        let mut config = RackwiseConfig::default();
        config.inventory_filter.enabled = true;
        config.inventory_filter.key = Some("extra.pool".to_string());
        config.inventory_filter.value = Some("batch".to_string());

        let nodes = list(inventory(&store, &config).unwrap().as_ref()).unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 1);
        assert_eq!(nodes[0]["uuid"], "n-b1");
    }
}
