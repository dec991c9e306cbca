//! Transfer outcome codes
//!
//! The compliance pipeline evaluates its checks in a fixed order and
//! reports the earliest-evaluated denial. The numeric codes are part of the
//! public contract: callers compare against them across deployments.
//!
//! Precedence (highest first): lock, freeze, rules, sender registration,
//! receiver registration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric result of a transfer-permission evaluation.
///
/// `Ok` is 0; denial codes are ordered by check precedence. When a transfer
/// meets several denial conditions at once, the reported code is always the
/// one with the lowest number above zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransferCode {
    /// Transfer permitted
    Ok = 0,
    /// An active lock window covers the sender/receiver pair
    Locked = 1,
    /// Caller, sender, or receiver is frozen
    Frozen = 2,
    /// A rule validator rejected the transfer
    RuleRejected = 3,
    /// Sender is not registered with the identity registry
    NonRegisteredSender = 4,
    /// Receiver is not registered with the identity registry
    NonRegisteredReceiver = 5,
}

impl TransferCode {
    /// Numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Whether the transfer is permitted.
    pub fn is_ok(&self) -> bool {
        matches!(self, TransferCode::Ok)
    }
}

impl fmt::Display for TransferCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferCode::Ok => "OK",
            TransferCode::Locked => "LOCKED",
            TransferCode::Frozen => "FROZEN",
            TransferCode::RuleRejected => "RULE_REJECTED",
            TransferCode::NonRegisteredSender => "NON_REGISTERED_SENDER",
            TransferCode::NonRegisteredReceiver => "NON_REGISTERED_RECEIVER",
        };
        write!(f, "{name}")
    }
}
