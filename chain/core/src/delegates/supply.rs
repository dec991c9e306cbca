//! Supply delegate — minting, burning, terminal finish-minting
//!
//! All three operations mutate the shared core state directly. Mints and
//! burns update the audit ledger in the same invocation as the balance
//! change, so both commit or roll back together.

use rust_decimal::Decimal;
use types::address::Address;
use types::errors::{CoreError, SupplyError};
use types::ids::TokenId;
use types::outcome::TransferCode;

use crate::audit;
use crate::events::{Burned, CoreEvent, Minted, MintingFinished};
use crate::metering::{ExecutionMeter, COST_BALANCE_MUTATION, COST_CHECK_STAGE};
use crate::oracle::RatesOracle;
use crate::state::CoreState;

use super::{Capability, CheckEnv, ComplianceDelegate, TransferContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyDelegate;

impl ComplianceDelegate for SupplyDelegate {
    fn name(&self) -> &'static str {
        "supply"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Supply]
    }

    fn check_transfer(
        &self,
        _env: &CheckEnv<'_>,
        _ctx: &TransferContext<'_>,
        meter: &mut ExecutionMeter,
    ) -> Result<TransferCode, CoreError> {
        // No transfer restriction; charged as a pass-through stage.
        meter.charge(COST_CHECK_STAGE)?;
        Ok(TransferCode::Ok)
    }

    fn mint(
        &self,
        state: &mut CoreState,
        oracle: &dyn RatesOracle,
        token: TokenId,
        recipients: &[Address],
        amounts: &[Decimal],
        now: i64,
        meter: &mut ExecutionMeter,
    ) -> Result<Vec<CoreEvent>, CoreError> {
        if recipients.len() != amounts.len() {
            return Err(SupplyError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            }
            .into());
        }
        if state.token(token)?.minting_finished {
            return Err(SupplyError::MintingFinished.into());
        }

        let mut events = Vec::with_capacity(recipients.len());
        for (recipient, amount) in recipients.iter().zip(amounts) {
            meter.charge(COST_BALANCE_MUTATION)?;
            if *amount <= Decimal::ZERO {
                return Err(CoreError::InvalidAmount);
            }

            let record = state.token_mut(token)?;
            record.total_supply = record
                .total_supply
                .checked_add(*amount)
                .ok_or(SupplyError::Overflow)?;
            state.credit(token, recipient, *amount, now)?;
            audit::record_movement(state, oracle, token, None, Some(recipient), *amount, now, meter)?;

            events.push(CoreEvent::Minted(Minted {
                token,
                recipient: recipient.clone(),
                amount: *amount,
            }));
        }
        Ok(events)
    }

    fn burn(
        &self,
        state: &mut CoreState,
        oracle: &dyn RatesOracle,
        token: TokenId,
        holder: &Address,
        amount: Decimal,
        now: i64,
        meter: &mut ExecutionMeter,
    ) -> Result<CoreEvent, CoreError> {
        meter.charge(COST_BALANCE_MUTATION)?;
        if amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }

        let available = state.balance_of(token, holder);
        if available < amount {
            return Err(SupplyError::InsufficientBalance {
                required: amount.to_string(),
                available: available.to_string(),
            }
            .into());
        }

        state.debit(token, holder, amount)?;
        let record = state.token_mut(token)?;
        record.total_supply = record
            .total_supply
            .checked_sub(amount)
            .ok_or(SupplyError::Overflow)?;
        audit::record_movement(state, oracle, token, Some(holder), None, amount, now, meter)?;

        Ok(CoreEvent::Burned(Burned {
            token,
            holder: holder.clone(),
            amount,
        }))
    }

    fn finish_minting(
        &self,
        state: &mut CoreState,
        token: TokenId,
    ) -> Result<CoreEvent, CoreError> {
        let record = state.token_mut(token)?;
        if record.minting_finished {
            return Err(SupplyError::MintingFinished.into());
        }
        record.minting_finished = true;
        Ok(CoreEvent::MintingFinished(MintingFinished { token }))
    }
}
