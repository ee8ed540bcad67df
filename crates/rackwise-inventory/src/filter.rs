//! Attribute-pattern filter over inventory records.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use rackwise_core::config::FilterConfig;

use crate::error::{InventoryError, InventoryResult};
use crate::path::AttributePath;

/// Keeps records whose value at `path` contains a match for `pattern`.
///
/// The pattern is searched, not anchored: `cpe` matches `cpe-east`. Use
/// `^`/`$` in the pattern for whole-value matches. Records where the path
/// does not resolve to a scalar are excluded, never an error.
#[derive(Debug, Clone)]
pub struct InventoryFilter {
    path: AttributePath,
    pattern: Regex,
}

impl InventoryFilter {
    /// Compile a filter. Invalid paths and patterns fail here, once.
    pub fn new(path: &str, pattern: &str) -> InventoryResult<Self> {
        let path = AttributePath::parse(path)?;
        let pattern = Regex::new(pattern).map_err(|source| InventoryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { path, pattern })
    }

    /// Build the configured filter, or `None` when filtering is disabled.
    pub fn from_config(config: &FilterConfig) -> InventoryResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let key = config
            .key
            .as_deref()
            .ok_or(InventoryError::MissingFilterField("key"))?;
        let value = config
            .value
            .as_deref()
            .ok_or(InventoryError::MissingFilterField("value"))?;
        Self::new(key, value).map(Some)
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.path
            .resolve_str(record)
            .is_some_and(|value| self.pattern.is_match(&value))
    }

    /// Matching records, in input order.
    pub fn filter_values(&self, records: Vec<Value>) -> Vec<Value> {
        let total = records.len();
        let kept: Vec<Value> = records.into_iter().filter(|r| self.matches(r)).collect();
        debug!(
            path = %self.path,
            pattern = %self.pattern,
            total,
            kept = kept.len(),
            "inventory filtered"
        );
        kept
    }

    /// Matching typed records, in input order.
    ///
    /// Each record is viewed through its serialized form; a record that
    /// fails to serialize cannot be matched and is dropped.
    pub fn filter<T: Serialize>(&self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .filter(|record| match serde_json::to_value(record) {
                Ok(value) => self.matches(&value),
                Err(e) => {
                    warn!(error = %e, "record could not be serialized for filtering");
                    false
                }
            })
            .collect()
    }
}
