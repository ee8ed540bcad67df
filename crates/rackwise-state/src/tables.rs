//! redb table definitions for the rackwise inventory store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized records).
//! Composite keys follow the pattern `{parent_id}:{child_id}`.

use redb::TableDefinition;

/// Shape shared by every rackwise table.
pub type RecordTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Node records keyed by `{node_uuid}`.
pub const NODES: RecordTable = TableDefinition::new("nodes");

/// Port records keyed by `{node_uuid}:{port_uuid}`.
pub const PORTS: RecordTable = TableDefinition::new("ports");

/// Instance records keyed by `{project_id}:{instance_uuid}`.
pub const INSTANCES: RecordTable = TableDefinition::new("instances");
