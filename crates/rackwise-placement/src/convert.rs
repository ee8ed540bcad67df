//! Type conversions between inventory records and placement types.
//!
//! Bridges `rackwise_state::NodeRecord` to [`HostCandidate`] and a compute
//! scheduling request to a [`WeighContext`].

use std::collections::HashMap;

use rackwise_state::NodeRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlacementError, PlacementResult};
use crate::weigher::{HostCandidate, WeighContext};

/// The parts of a compute scheduling request the weighers look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRequest {
    pub project_id: String,
    pub hostname: String,
    /// Instance metadata; `role` is read from here.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Flavor extra specs; the workload class marker is read from here.
    #[serde(default)]
    pub extra_specs: HashMap<String, String>,
}

/// Convert a [`NodeRecord`] to a [`HostCandidate`].
///
/// The rack comes from `properties.rack`. Every scalar property is carried
/// into the stat bag in its string form.
pub fn host_from_node(node: &NodeRecord) -> HostCandidate {
    let stats = node
        .properties
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect();

    HostCandidate {
        host_id: node.uuid.clone(),
        rack: node.rack().map(str::to_string),
        stats,
    }
}

/// First non-empty extra spec among `keys`, in order.
pub fn workload_class(extra_specs: &HashMap<String, String>, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|key| extra_specs.get(key))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Build a fresh weighing context for a request.
///
/// The role is the `role` metadata entry, falling back to the hostname.
pub fn context_from_request(
    request: &InstanceRequest,
    workload_class_keys: &[String],
) -> PlacementResult<WeighContext> {
    let role = request
        .metadata
        .get("role")
        .filter(|role| !role.is_empty())
        .unwrap_or(&request.hostname);
    if role.is_empty() {
        return Err(PlacementError::MissingRole {
            project_id: request.project_id.clone(),
        });
    }

    let mut ctx = WeighContext::new(request.project_id.as_str(), role.as_str());
    ctx.workload_class = workload_class(&request.extra_specs, workload_class_keys);
    Ok(ctx)
}
