//! Core Storage & Compliance Logic for Regulated Tokens
//!
//! This crate implements the shared storage core that many lightweight
//! front-ends delegate to: token state, the pluggable compliance delegate
//! chain, audit bookkeeping, and the composable rule-validation engine.
//!
//! # Modules
//! - `security`: Operator authorization and pause guard
//! - `oracle`: Consumed external interfaces (identity registry, rates oracle)
//! - `state`: Persistent token state owned by the core
//! - `metering`: Bounded per-invocation execution budget
//! - `events`: Core event taxonomy
//! - `rules`: Composable boolean rule validators
//! - `delegates`: Pluggable compliance delegates (lock, freeze, KYC, supply, proof)
//! - `compliance`: Ordered transfer-permission pipeline
//! - `audit`: Cumulative-flow audit ledger with currency conversion
//! - `core`: The storage core and its dispatch surface
//! - `proxy`: Stateless front-end bound to one token

pub mod audit;
pub mod compliance;
pub mod core;
pub mod delegates;
pub mod events;
pub mod metering;
pub mod oracle;
pub mod proxy;
pub mod rules;
pub mod security;
pub mod state;

/// Core ABI version — frozen after release
pub const CORE_ABI_VERSION: &str = "1.0.0";

/// Current unix time in seconds, for callers that do not inject a clock.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
