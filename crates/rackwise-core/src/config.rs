//! rackwise.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::NetworkTagMap;

/// Flavor extra-spec keys that carry the workload class marker.
pub const DEFAULT_WORKLOAD_CLASS_KEYS: [&str; 2] = ["sku", "capabilities:sku"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackwiseConfig {
    pub topology: TopologyConfig,
    pub inventory_filter: FilterConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// VLAN tag → network name substring used to pick an interface.
    pub tag2net: NetworkTagMap,
}

/// Scopes a shared node pool to the nodes relevant to this deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub enabled: bool,
    /// Dotted attribute path into a node record, e.g. `extra.pool`.
    pub key: Option<String>,
    /// Regex searched in the value found at `key`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub workload_class_keys: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workload_class_keys: DEFAULT_WORKLOAD_CLASS_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("inventory_filter is enabled but `{0}` is not set")]
    MissingFilterField(&'static str),
}

impl RackwiseConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: RackwiseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject combinations that would only fail later, at first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory_filter.enabled {
            if self.inventory_filter.key.is_none() {
                return Err(ConfigError::MissingFilterField("key"));
            }
            if self.inventory_filter.value.is_none() {
                return Err(ConfigError::MissingFilterField("value"));
            }
        }
        Ok(())
    }
}
