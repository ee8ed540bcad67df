//! StateStore: redb-backed inventory persistence for rackwise.
//!
//! Provides typed CRUD operations over nodes, ports, and instances. All
//! values are JSON-serialized into redb's `&[u8]` value columns. The store
//! supports both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe inventory store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.open_table(PORTS).map_err(map_err!(Table))?;
        txn.open_table(INSTANCES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic table access ───────────────────────────────────────

    fn put<T: Serialize>(
        &self,
        table_def: RecordTable,
        key: &str,
        record: &T,
    ) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
        key: &str,
    ) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table_def).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Scan a table, keeping records whose key starts with `prefix`.
    fn scan<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
        prefix: &str,
    ) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table_def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(prefix) {
                let record: T =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                results.push(record);
            }
        }
        Ok(results)
    }

    fn remove(&self, table_def: RecordTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Insert or update a node record.
    pub fn put_node(&self, node: &NodeRecord) -> StateResult<()> {
        self.put(NODES, &node.uuid, node)?;
        debug!(node = %node.uuid, name = %node.name, "node stored");
        Ok(())
    }

    /// Get a node by UUID.
    pub fn get_node(&self, node_uuid: &str) -> StateResult<Option<NodeRecord>> {
        self.get(NODES, node_uuid)
    }

    /// Get a node by UUID, treating absence as an error.
    pub fn require_node(&self, node_uuid: &str) -> StateResult<NodeRecord> {
        self.get_node(node_uuid)?
            .ok_or_else(|| StateError::NotFound(format!("node {node_uuid}")))
    }

    /// List all nodes.
    pub fn list_nodes(&self) -> StateResult<Vec<NodeRecord>> {
        self.scan(NODES, "")
    }

    /// Delete a node and its ports. Returns true if the node existed.
    pub fn delete_node(&self, node_uuid: &str) -> StateResult<bool> {
        let prefix = format!("{node_uuid}:");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        let mut port_keys = Vec::new();
        {
            let mut nodes = txn.open_table(NODES).map_err(map_err!(Table))?;
            existed = nodes.remove(node_uuid).map_err(map_err!(Write))?.is_some();
            let mut ports = txn.open_table(PORTS).map_err(map_err!(Table))?;
            for entry in ports.iter().map_err(map_err!(Read))? {
                let (key, _) = entry.map_err(map_err!(Read))?;
                if key.value().starts_with(&prefix) {
                    port_keys.push(key.value().to_string());
                }
            }
            for key in &port_keys {
                ports.remove(key.as_str()).map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(node = %node_uuid, existed, ports = port_keys.len(), "node deleted");
        Ok(existed)
    }

    // ── Ports ──────────────────────────────────────────────────────

    /// Insert or update a port record.
    pub fn put_port(&self, port: &PortRecord) -> StateResult<()> {
        self.put(PORTS, &port.table_key(), port)
    }

    /// List all ports registered for a node.
    pub fn list_ports_for_node(&self, node_uuid: &str) -> StateResult<Vec<PortRecord>> {
        self.scan(PORTS, &format!("{node_uuid}:"))
    }

    /// Delete a port by composite key. Returns true if it existed.
    pub fn delete_port(&self, key: &str) -> StateResult<bool> {
        self.remove(PORTS, key)
    }

    // ── Instances ──────────────────────────────────────────────────

    /// Insert or update an instance record.
    pub fn put_instance(&self, instance: &InstanceRecord) -> StateResult<()> {
        self.put(INSTANCES, &instance.table_key(), instance)
    }

    /// Get an instance by its composite key.
    pub fn get_instance(&self, key: &str) -> StateResult<Option<InstanceRecord>> {
        self.get(INSTANCES, key)
    }

    /// List instances of one project with the requested deletion state.
    pub fn list_instances(&self, filter: &InstanceFilter) -> StateResult<Vec<InstanceRecord>> {
        let prefix = format!("{}:", filter.project_id);
        let instances: Vec<InstanceRecord> = self.scan(INSTANCES, &prefix)?;
        Ok(instances
            .into_iter()
            .filter(|inst| filter.matches(inst))
            .collect())
    }

    /// Delete an instance by key. Returns true if it existed.
    pub fn delete_instance(&self, key: &str) -> StateResult<bool> {
        self.remove(INSTANCES, key)
    }
}
