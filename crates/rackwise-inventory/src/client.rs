//! Inventory data-source calls and the filtering wrapper.

use rackwise_core::NodeId;
use rackwise_state::{NodeRecord, PortRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};
use crate::filter::InventoryFilter;

/// A query against the node inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCall {
    /// All nodes. Without `detail` only identifying fields are returned.
    ListNodes { detail: bool },
    GetNode { node_id: NodeId },
    ListPorts { node_id: NodeId, detail: bool },
}

impl InventoryCall {
    /// Method name used in logs and error messages.
    pub fn method(&self) -> &'static str {
        match self {
            InventoryCall::ListNodes { .. } => "node.list",
            InventoryCall::GetNode { .. } => "node.get",
            InventoryCall::ListPorts { .. } => "node.list_ports",
        }
    }
}

/// A source of inventory records.
///
/// Implementors answer raw calls with a generic tree; the provided methods
/// decode the common responses into typed records.
pub trait InventoryClient {
    fn call(&self, call: InventoryCall) -> InventoryResult<Value>;

    fn get_node(&self, node_id: &str) -> InventoryResult<NodeRecord> {
        let call = InventoryCall::GetNode {
            node_id: node_id.to_string(),
        };
        let method = call.method();
        decode(method, self.call(call)?)
    }

    fn list_nodes(&self) -> InventoryResult<Vec<NodeRecord>> {
        let call = InventoryCall::ListNodes { detail: true };
        let method = call.method();
        decode(method, self.call(call)?)
    }

    fn list_ports(&self, node_id: &str) -> InventoryResult<Vec<PortRecord>> {
        let call = InventoryCall::ListPorts {
            node_id: node_id.to_string(),
            detail: true,
        };
        let method = call.method();
        decode(method, self.call(call)?)
    }
}

impl<C: InventoryClient + ?Sized> InventoryClient for &C {
    fn call(&self, call: InventoryCall) -> InventoryResult<Value> {
        (**self).call(call)
    }
}

fn decode<T: DeserializeOwned>(method: &'static str, value: Value) -> InventoryResult<T> {
    serde_json::from_value(value).map_err(|e| InventoryError::UnexpectedResponse {
        method,
        reason: e.to_string(),
    })
}

/// Wraps a client so node listings only contain filtered records.
///
/// Listings are always requested with `detail = true`, since the filter
/// path usually points into fields a summary listing omits. Every other
/// call passes through untouched.
#[derive(Debug, Clone)]
pub struct FilteredClient<C> {
    inner: C,
    filter: InventoryFilter,
}

impl<C: InventoryClient> FilteredClient<C> {
    pub fn new(inner: C, filter: InventoryFilter) -> Self {
        Self { inner, filter }
    }

    pub fn filter(&self) -> &InventoryFilter {
        &self.filter
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: InventoryClient> InventoryClient for FilteredClient<C> {
    fn call(&self, call: InventoryCall) -> InventoryResult<Value> {
        match call {
            InventoryCall::ListNodes { detail } => {
                if !detail {
                    debug!("forcing detailed node listing for filtering");
                }
                let call = InventoryCall::ListNodes { detail: true };
                let method = call.method();
                match self.inner.call(call)? {
                    Value::Array(records) => Ok(Value::Array(self.filter.filter_values(records))),
                    other => Err(InventoryError::UnexpectedResponse {
                        method,
                        reason: format!("expected a sequence of nodes, got {}", type_name(&other)),
                    }),
                }
            }
            other => self.inner.call(other),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
