//! Dotted attribute paths over generic record trees.
//!
//! Inventory records have no fixed schema on this side, so a path such as
//! `extra.location.pool` is interpreted step by step against a
//! `serde_json::Value`: each segment selects a mapping key, or an element
//! when the current value is a sequence and the segment is an index.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{InventoryError, InventoryResult};

/// A parsed `a.b.c` accessor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    raw: String,
    segments: Vec<String>,
}

impl AttributePath {
    pub fn parse(raw: &str) -> InventoryResult<Self> {
        if raw.is_empty() {
            return Err(InventoryError::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty",
            });
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(InventoryError::InvalidPath {
                path: raw.to_string(),
                reason: "path has an empty segment",
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Walk the path from `record`. `None` as soon as a step is missing.
    pub fn resolve<'v>(&self, record: &'v Value) -> Option<&'v Value> {
        self.segments.iter().try_fold(record, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// String form of the scalar at the end of the path.
    ///
    /// Null, mappings and sequences have no string form and yield `None`.
    pub fn resolve_str<'v>(&self, record: &'v Value) -> Option<Cow<'v, str>> {
        match self.resolve(record)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }
}

impl FromStr for AttributePath {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
