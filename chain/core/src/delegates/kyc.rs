//! KYC delegate — rule-engine and identity-registry validation
//!
//! Third and fourth stages of the transfer pipeline: the token's ordered
//! rule validators run first (short-circuiting on the first rejection),
//! then sender and receiver registration are checked against the identity
//! registry, in that order.

use types::errors::CoreError;
use types::outcome::TransferCode;

use crate::metering::{ExecutionMeter, COST_CHECK_STAGE};

use super::{Capability, CheckEnv, ComplianceDelegate, TransferContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct KycDelegate;

impl ComplianceDelegate for KycDelegate {
    fn name(&self) -> &'static str {
        "kyc"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::TransferCheck]
    }

    fn check_transfer(
        &self,
        env: &CheckEnv<'_>,
        ctx: &TransferContext<'_>,
        meter: &mut ExecutionMeter,
    ) -> Result<TransferCode, CoreError> {
        meter.charge(COST_CHECK_STAGE)?;

        let rules = &env.state.token(ctx.token)?.rules;
        if !env.rules.evaluate(rules, ctx.from, ctx.to, ctx.amount, meter)? {
            return Ok(TransferCode::RuleRejected);
        }

        if !env.identity.is_valid(ctx.from) {
            return Ok(TransferCode::NonRegisteredSender);
        }
        if !env.identity.is_valid(ctx.to) {
            return Ok(TransferCode::NonRegisteredReceiver);
        }
        Ok(TransferCode::Ok)
    }
}
