//! Core event taxonomy
//!
//! Events are immutable records appended by core operations. The core keeps
//! an append-only log; events emitted by an invocation that later fails are
//! discarded with the rest of the rollback.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::address::{Address, AddressScope};
use types::ids::{AuditScopeId, ChainId, RuleId, TokenId};

/// A new logical token was defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDefined {
    pub token: TokenId,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Value moved between two holders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferExecuted {
    pub token: TokenId,
    pub from: Address,
    pub to: Address,
    pub amount: Decimal,
}

/// A spender was approved to move value on behalf of an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalSet {
    pub token: TokenId,
    pub owner: Address,
    pub spender: Address,
    pub amount: Decimal,
}

/// Supply minted to one recipient. One event per recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minted {
    pub token: TokenId,
    pub recipient: Address,
    pub amount: Decimal,
}

/// Supply burned from an operator's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burned {
    pub token: TokenId,
    pub holder: Address,
    pub amount: Decimal,
}

/// Minting was permanently finished for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintingFinished {
    pub token: TokenId,
}

/// A token's ordered rule validator list was replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesDefined {
    pub token: TokenId,
    pub rules: Vec<RuleId>,
}

/// A transfer lock was defined for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockDefined {
    pub token: TokenId,
    pub sender_scope: AddressScope,
    pub receiver_scope: AddressScope,
    pub start_at: i64,
    pub end_at: i64,
}

/// A transfer lock was removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRemoved {
    pub token: TokenId,
    pub index: usize,
}

/// A batch of addresses was frozen until a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressesFrozen {
    pub token: TokenId,
    pub addresses: Vec<Address>,
    pub until: i64,
}

/// An audit scope configuration was defined or replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfigured {
    pub scope: AuditScopeId,
}

/// An ownership proof snapshot was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofCreated {
    pub token: TokenId,
    pub holder: Address,
    pub proof_id: u64,
    pub amount: Decimal,
    pub start_at: i64,
    pub end_at: i64,
}

/// A token was bound to a delegate chain (or disabled with `chain: None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainBound {
    pub token: TokenId,
    pub chain: Option<ChainId>,
}

/// A new proxy front-end was bound to a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyDeployed {
    pub token: TokenId,
}

/// Enum wrapper for all core events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoreEvent {
    TokenDefined(TokenDefined),
    TransferExecuted(TransferExecuted),
    ApprovalSet(ApprovalSet),
    Minted(Minted),
    Burned(Burned),
    MintingFinished(MintingFinished),
    RulesDefined(RulesDefined),
    LockDefined(LockDefined),
    LockRemoved(LockRemoved),
    AddressesFrozen(AddressesFrozen),
    AuditConfigured(AuditConfigured),
    ProofCreated(ProofCreated),
    ChainBound(ChainBound),
    ProxyDeployed(ProxyDeployed),
}
