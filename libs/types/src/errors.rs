//! Error taxonomy for the regulated-token platform
//!
//! Comprehensive error taxonomy using thiserror. Every error aborts the
//! whole invocation; there is no partial-commit state anywhere in the
//! platform.

use crate::ids::{AuditScopeId, ChainId, DelegateId, RuleId, TokenId};
use crate::outcome::TransferCode;
use thiserror::Error;

/// Top-level platform error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Transfer denied with code {code}")]
    TransferDenied { code: TransferCode },

    #[error("Unauthorized: caller {caller} is not an operator")]
    NotOperator { caller: String },

    #[error("Unauthorized: caller {caller} is not admin")]
    NotAdmin { caller: String },

    #[error("Core is paused")]
    Paused,

    #[error("Unknown token: {token}")]
    UnknownToken { token: TokenId },

    #[error("Token {token} is disabled (no delegate chain bound)")]
    TokenDisabled { token: TokenId },

    #[error("Unknown delegate chain: {chain}")]
    UnknownChain { chain: ChainId },

    #[error("Unknown delegate: {delegate}")]
    UnknownDelegate { delegate: DelegateId },

    #[error("Delegate {delegate} is already registered")]
    DelegateExists { delegate: DelegateId },

    #[error("Unknown lock index: {index}")]
    UnknownLock { index: usize },

    #[error("No delegate in the chain supports capability {capability}")]
    CapabilityUnsupported { capability: String },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance { required: String, approved: String },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid lock window: start {start_at} is not before end {end_at}")]
    InvalidLockWindow { start_at: i64, end_at: i64 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Execution budget exhausted after {spent} of {budget} units")]
    BudgetExhausted { spent: u64, budget: u64 },

    #[error("Supply error: {0}")]
    Supply(#[from] SupplyError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),
}

/// Minting/burning errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SupplyError {
    #[error("Recipient/amount length mismatch: {recipients} recipients, {amounts} amounts")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("Minting is finished for this token")]
    MintingFinished,

    #[error("Insufficient balance to burn: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Arithmetic overflow in supply calculation")]
    Overflow,
}

/// Audit ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    #[error("Unknown audit scope: {scope}")]
    UnknownScope { scope: AuditScopeId },

    #[error("Arithmetic overflow in audit accumulation")]
    Overflow,
}

/// Rule engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("Unknown rule validator: {rule}")]
    UnknownRule { rule: RuleId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_error_converts_to_core_error() {
        let err: CoreError = SupplyError::MintingFinished.into();
        assert_eq!(err, CoreError::Supply(SupplyError::MintingFinished));
    }

    #[test]
    fn test_denial_carries_code() {
        let err = CoreError::TransferDenied {
            code: TransferCode::Locked,
        };
        assert!(err.to_string().contains("LOCKED"));
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = SupplyError::LengthMismatch {
            recipients: 2,
            amounts: 3,
        };
        assert!(err.to_string().contains("2 recipients"));
        assert!(err.to_string().contains("3 amounts"));
    }
}
