//! `InventoryClient` for the embedded store.

use rackwise_state::{NodeRecord, PortRecord, StateError, StateStore};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::{InventoryCall, InventoryClient};
use crate::error::{InventoryError, InventoryResult};

impl InventoryClient for StateStore {
    fn call(&self, call: InventoryCall) -> InventoryResult<Value> {
        debug!(method = call.method(), "inventory call");
        match call {
            InventoryCall::ListNodes { detail } => {
                let nodes = self.list_nodes()?;
                if detail {
                    to_tree(&nodes)
                } else {
                    Ok(Value::Array(nodes.iter().map(node_summary).collect()))
                }
            }
            InventoryCall::GetNode { node_id } => match self.require_node(&node_id) {
                Ok(node) => to_tree(&node),
                Err(StateError::NotFound(_)) => Err(InventoryError::NotFound(format!("node {node_id}"))),
                Err(e) => Err(e.into()),
            },
            InventoryCall::ListPorts { node_id, detail } => {
                let ports = self.list_ports_for_node(&node_id)?;
                if detail {
                    to_tree(&ports)
                } else {
                    Ok(Value::Array(ports.iter().map(port_summary).collect()))
                }
            }
        }
    }
}

fn node_summary(node: &NodeRecord) -> Value {
    json!({"uuid": node.uuid, "name": node.name})
}

fn port_summary(port: &PortRecord) -> Value {
    json!({"uuid": port.uuid, "address": port.address})
}

fn to_tree<T: Serialize + ?Sized>(record: &T) -> InventoryResult<Value> {
    serde_json::to_value(record).map_err(|e| StateError::Serialize(e.to_string()).into())
}
