//! Lock delegate — time-boxed transfer restrictions
//!
//! First stage of the transfer pipeline. Any lock whose sender and
//! receiver scopes both cover the transfer, and whose window contains the
//! current time, blocks it.

use types::errors::CoreError;
use types::outcome::TransferCode;

use crate::metering::{ExecutionMeter, COST_CHECK_STAGE, COST_LOCK_WINDOW};

use super::{Capability, CheckEnv, ComplianceDelegate, TransferContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct LockDelegate;

impl ComplianceDelegate for LockDelegate {
    fn name(&self) -> &'static str {
        "lock"
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
        for lock in env.state.locks(ctx.token) {
            meter.charge(COST_LOCK_WINDOW)?;
            if lock.blocks(ctx.from, ctx.to, ctx.now) {
                return Ok(TransferCode::Locked);
            }
        }
        Ok(TransferCode::Ok)
    }
}
