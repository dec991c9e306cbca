//! Ownership-proof delegate — immutable balance snapshots
//!
//! A proof captures the holder's current balance over a bounded window:
//! from the end of their previous proof (or their first appearance) up to
//! the current time. Consecutive proofs for one holder are contiguous and
//! never overlap, so a holder can prove historical holdings without
//! trusting external observers.

use types::address::Address;
use types::errors::CoreError;
use types::ids::TokenId;

use crate::events::{CoreEvent, ProofCreated};
use crate::metering::{ExecutionMeter, COST_PROOF};
use crate::state::{CoreState, OwnershipProof};

use super::{Capability, ComplianceDelegate};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProofDelegate;

impl ComplianceDelegate for ProofDelegate {
    fn name(&self) -> &'static str {
        "proof"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Proof]
    }

    fn create_proof(
        &self,
        state: &mut CoreState,
        token: TokenId,
        holder: &Address,
        now: i64,
        meter: &mut ExecutionMeter,
    ) -> Result<(u64, CoreEvent), CoreError> {
        meter.charge(COST_PROOF)?;
        state.token(token)?;

        let start_at = match state.proofs(token, holder).last() {
            Some(previous) => previous.end_at,
            None => state.first_seen(token, holder).unwrap_or(now),
        };

        let proof = OwnershipProof {
            amount: state.balance_of(token, holder),
            start_at,
            end_at: now,
        };
        let proof_id = state.push_proof(token, holder, proof.clone());

        let event = CoreEvent::ProofCreated(ProofCreated {
            token,
            holder: holder.clone(),
            proof_id,
            amount: proof.amount,
            start_at: proof.start_at,
            end_at: proof.end_at,
        });
        Ok((proof_id, event))
    }
}
