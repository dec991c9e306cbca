//! Unique identifier types for platform entities
//!
//! The token identifier uses UUID v7 for time-sortable ordering, enabling
//! efficient chronological queries. Configuration identifiers (delegate
//! chains, audit scopes, rules) are small integer newtypes assigned by the
//! operator at configuration time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a logical token (regulated fungible asset)
///
/// Uses UUID v7 for time-based sorting. Tokens can be efficiently
/// enumerated in creation order using the embedded timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    /// Create a new TokenId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! config_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

config_id! {
    /// Identifier of a registered compliance delegate implementation
    ///
    /// At most one implementation may be registered per id.
    DelegateId
}

config_id! {
    /// Identifier of an ordered delegate chain
    ChainId
}

config_id! {
    /// Identifier of an audit bookkeeping scope
    AuditScopeId
}

config_id! {
    /// Identifier of a registered rule validator
    RuleId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_unique() {
        let a = TokenId::new();
        let b = TokenId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_id_serde_transparent() {
        let id = TokenId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with('"'), "Must serialize as a bare string");
        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_config_id_roundtrip() {
        let id = DelegateId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: DelegateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), 7);
    }

    #[test]
    fn test_config_id_display() {
        assert_eq!(ChainId::new(3).to_string(), "3");
        assert_eq!(RuleId::new(12).to_string(), "12");
    }
}
