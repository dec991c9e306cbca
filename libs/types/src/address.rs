//! Address types for holders, operators, and lock scopes
//!
//! Addresses identify external parties (holders, operators, callers). The
//! platform treats them as opaque strings; validity is delegated to the
//! identity registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque external address of a holder, operator, or caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Address pattern used by transfer locks.
///
/// `Any` is the wildcard: it matches every address, so a lock scoped
/// `(Any, Any)` blocks all transfers during its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressScope {
    /// Matches any address
    Any,
    /// Matches exactly one address
    Exact(Address),
}

impl AddressScope {
    /// Check whether this scope covers the given address.
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            AddressScope::Any => true,
            AddressScope::Exact(a) => a == address,
        }
    }
}
