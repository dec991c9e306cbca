//! Types library for the regulated-token platform
//!
//! This library provides the core type definitions shared across the
//! platform, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (TokenId, DelegateId, ChainId, AuditScopeId, RuleId)
//! - `address`: Opaque addresses and lock address scopes
//! - `outcome`: Transfer outcome codes with fixed precedence
//! - `errors`: Error taxonomy

// Public modules
pub mod address;
pub mod errors;
pub mod ids;
pub mod outcome;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::outcome::*;
}
