//! rackwise-state: embedded inventory store for rackwise.
//!
//! Backed by [redb](https://docs.rs/redb), holds the node, port and
//! instance records that topology resolution, inventory filtering and
//! rack weighing read from.
//!
//! # Architecture
//!
//! All records are JSON-serialized into redb's `&[u8]` value columns.
//! Key order inside record maps is preserved, so the interface groups
//! of a node come back in the order they were declared. Composite keys
//! (`{node_uuid}:{port_uuid}`, `{project_id}:{instance_uuid}`) enable
//! prefix scans for related records.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across scheduling passes.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
