//! Error classification shared by every rackwise crate.
//!
//! Each crate keeps its own error enum; `ErrorKind` is the common
//! vocabulary callers use to decide whether a failure is worth retrying.

use std::fmt;

/// Coarse classification of a rackwise failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A topology group, rack label, or inventory record does not exist.
    NotFound,
    /// Configuration or declared data is inconsistent (unmapped VLAN tag,
    /// invalid pattern, malformed topology).
    Configuration,
    /// The inventory collaborator failed.
    Upstream,
}

impl ErrorKind {
    /// Only upstream failures can succeed on a later attempt.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Upstream)
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Upstream => "upstream",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
