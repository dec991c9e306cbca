//! Pluggable compliance delegates
//!
//! A delegate implements one capability of the platform: a transfer
//! validation stage, supply management, or ownership-proof creation. The
//! core binds an ordered chain of delegate ids to each token and executes
//! delegate logic directly against its own storage — delegates receive the
//! core's `CoreState`, never a private copy. That is why delegate code is
//! kept minimal and composed from this fixed, reviewed set.
//!
//! # Delegates
//! - `lock`: time-boxed transfer locks
//! - `freeze`: per-address freezes with configurable checked parties
//! - `kyc`: rule-engine and identity-registry validation
//! - `supply`: minting, burning, terminal finish-minting
//! - `proof`: on-demand ownership proof snapshots

use rust_decimal::Decimal;
use std::fmt;
use types::address::Address;
use types::errors::CoreError;
use types::ids::{DelegateId, TokenId};
use types::outcome::TransferCode;

use crate::events::CoreEvent;
use crate::metering::ExecutionMeter;
use crate::oracle::{IdentityRegistry, RatesOracle};
use crate::rules::RuleSet;
use crate::state::CoreState;

pub mod freeze;
pub mod kyc;
pub mod lock;
pub mod proof;
pub mod supply;

pub use freeze::{FreezeDelegate, FrozenParties};
pub use kyc::KycDelegate;
pub use lock::LockDelegate;
pub use proof::ProofDelegate;
pub use supply::SupplyDelegate;

/// Capability a delegate can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Participates in the transfer-permission pipeline
    TransferCheck,
    /// Handles mint, burn, and finish-minting
    Supply,
    /// Creates ownership-proof snapshots
    Proof,
}

/// The transfer being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct TransferContext<'a> {
    pub token: TokenId,
    /// Logical caller of the invocation (spender for delegated transfers).
    pub caller: &'a Address,
    pub from: &'a Address,
    pub to: &'a Address,
    pub amount: Decimal,
    pub now: i64,
}

/// Read-only environment handed to transfer checks.
pub struct CheckEnv<'a> {
    pub state: &'a CoreState,
    pub identity: &'a dyn IdentityRegistry,
    pub rules: &'a RuleSet,
}

/// One pluggable logic module bound into a token's delegate chain.
///
/// Capability methods default to `CapabilityUnsupported`; a delegate
/// overrides exactly the ones it declares in `capabilities()`.
pub trait ComplianceDelegate: fmt::Debug {
    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Capabilities this delegate provides.
    fn capabilities(&self) -> &'static [Capability];

    /// Whether the delegate provides a capability.
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Transfer-validation stage. Delegates without a check pass through.
    fn check_transfer(
        &self,
        _env: &CheckEnv<'_>,
        _ctx: &TransferContext<'_>,
        _meter: &mut ExecutionMeter,
    ) -> Result<TransferCode, CoreError> {
        Ok(TransferCode::Ok)
    }

    /// Mint new supply to each recipient. One `Minted` event per recipient.
    #[allow(clippy::too_many_arguments)]
    fn mint(
        &self,
        _state: &mut CoreState,
        _oracle: &dyn RatesOracle,
        _token: TokenId,
        _recipients: &[Address],
        _amounts: &[Decimal],
        _now: i64,
        _meter: &mut ExecutionMeter,
    ) -> Result<Vec<CoreEvent>, CoreError> {
        Err(CoreError::CapabilityUnsupported {
            capability: "supply".to_string(),
        })
    }

    /// Burn supply from a holder's balance.
    #[allow(clippy::too_many_arguments)]
    fn burn(
        &self,
        _state: &mut CoreState,
        _oracle: &dyn RatesOracle,
        _token: TokenId,
        _holder: &Address,
        _amount: Decimal,
        _now: i64,
        _meter: &mut ExecutionMeter,
    ) -> Result<CoreEvent, CoreError> {
        Err(CoreError::CapabilityUnsupported {
            capability: "supply".to_string(),
        })
    }

    /// Permanently finish minting for a token. Terminal: cannot be undone.
    fn finish_minting(
        &self,
        _state: &mut CoreState,
        _token: TokenId,
    ) -> Result<CoreEvent, CoreError> {
        Err(CoreError::CapabilityUnsupported {
            capability: "supply".to_string(),
        })
    }

    /// Create an ownership-proof snapshot for a holder.
    fn create_proof(
        &self,
        _state: &mut CoreState,
        _token: TokenId,
        _holder: &Address,
        _now: i64,
        _meter: &mut ExecutionMeter,
    ) -> Result<(u64, CoreEvent), CoreError> {
        Err(CoreError::CapabilityUnsupported {
            capability: "proof".to_string(),
        })
    }
}

/// Conventional delegate ids used by the standard chain.
pub const LOCK_DELEGATE: DelegateId = DelegateId::new(1);
pub const FREEZE_DELEGATE: DelegateId = DelegateId::new(2);
pub const KYC_DELEGATE: DelegateId = DelegateId::new(3);
pub const SUPPLY_DELEGATE: DelegateId = DelegateId::new(4);
pub const PROOF_DELEGATE: DelegateId = DelegateId::new(5);

/// The standard reviewed delegate set, in pipeline order.
///
/// Check precedence follows the chain order: lock, then freeze, then
/// rules/registry. Supply and proof delegates carry no transfer check.
pub fn standard() -> Vec<(DelegateId, Box<dyn ComplianceDelegate>)> {
    vec![
        (LOCK_DELEGATE, Box::new(LockDelegate) as Box<dyn ComplianceDelegate>),
        (FREEZE_DELEGATE, Box::new(FreezeDelegate::default())),
        (KYC_DELEGATE, Box::new(KycDelegate)),
        (SUPPLY_DELEGATE, Box::new(SupplyDelegate)),
        (PROOF_DELEGATE, Box::new(ProofDelegate)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_order_and_ids() {
        let delegates = standard();
        let ids: Vec<DelegateId> = delegates.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                LOCK_DELEGATE,
                FREEZE_DELEGATE,
                KYC_DELEGATE,
                SUPPLY_DELEGATE,
                PROOF_DELEGATE
            ]
        );
    }

    #[test]
    fn test_capability_declarations() {
        let delegates = standard();
        assert!(delegates[0].1.supports(Capability::TransferCheck));
        assert!(!delegates[0].1.supports(Capability::Supply));
        assert!(delegates[3].1.supports(Capability::Supply));
        assert!(delegates[4].1.supports(Capability::Proof));
    }
}
