//! rackwise-inventory: scope a shared device inventory to one deployment.
//!
//! Several deployments can draw from the same pool of bare-metal nodes.
//! An [`InventoryFilter`] keeps the records whose value at a dotted
//! attribute path (e.g. `extra.pool`) matches a regex, and
//! [`FilteredClient`] applies it transparently to every node listing.
//!
//! # Components
//!
//! - **`path`**: dotted attribute paths over generic JSON trees
//! - **`filter`**: `InventoryFilter` (compiled once, search semantics)
//! - **`client`**: `InventoryClient` calls and the `FilteredClient` wrapper
//! - **`store`**: `InventoryClient` for the embedded `StateStore`

pub mod client;
pub mod error;
pub mod filter;
pub mod path;
pub mod store;

pub use client::{FilteredClient, InventoryCall, InventoryClient};
pub use error::{InventoryError, InventoryResult};
pub use filter::InventoryFilter;
pub use path::AttributePath;
