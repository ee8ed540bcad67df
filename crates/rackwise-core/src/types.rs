//! Shared types used across rackwise crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inventory identifier of a bare-metal node.
pub type NodeId = String;

/// Identifier of a schedulable host (the node a scheduler sees).
pub type HostId = String;

/// Opaque rack label. Compared by equality only.
pub type RackId = String;

/// VLAN tag → logical network name substring.
///
/// Loaded once from configuration and shared read-only by every
/// topology resolution. Tags are kept as strings so `101` and `"101"`
/// in the node description address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkTagMap(BTreeMap<String, String>);

impl NetworkTagMap {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Network name substring mapped to `tag`, if any.
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for NetworkTagMap {
    fn default() -> Self {
        [("101", "mgmt"), ("102", "data"), ("103", "prod")]
            .into_iter()
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NetworkTagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
