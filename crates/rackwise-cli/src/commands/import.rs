use std::path::Path;

use rackwise_state::{InstanceRecord, NodeRecord, PortRecord, StateStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// An inventory snapshot as read by `rackwise import`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InventoryDocument {
    pub nodes: Vec<NodeRecord>,
    pub ports: Vec<PortRecord>,
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub nodes: usize,
    pub ports: usize,
    pub instances: usize,
}

pub fn import(store: &StateStore, path: &Path) -> anyhow::Result<ImportSummary> {
    let content = std::fs::read_to_string(path)?;
    let document: InventoryDocument = serde_json::from_str(&content)?;
    let summary = store_document(store, &document)?;
    info!(path = %path.display(), ?summary, "inventory imported");
    Ok(summary)
}

/// Write every record of `document`, replacing records with the same key.
pub fn store_document(
    store: &StateStore,
    document: &InventoryDocument,
) -> anyhow::Result<ImportSummary> {
    for node in &document.nodes {
        store.put_node(node)?;
    }
    for port in &document.ports {
        store.put_port(port)?;
    }
    for instance in &document.instances {
        store.put_instance(instance)?;
    }
    Ok(ImportSummary {
        nodes: document.nodes.len(),
        ports: document.ports.len(),
        instances: document.instances.len(),
    })
}
