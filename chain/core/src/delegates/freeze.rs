//! Freeze delegate — per-address restrictions until a timestamp
//!
//! Second stage of the transfer pipeline. Which parties are inspected is
//! delegate configuration, not a universal rule: deployed chains differ on
//! whether the logical caller is checked in addition to sender and
//! receiver.

use types::errors::CoreError;
use types::outcome::TransferCode;

use crate::metering::{ExecutionMeter, COST_CHECK_STAGE};

use super::{Capability, CheckEnv, ComplianceDelegate, TransferContext};

/// Which parties of a transfer the freeze check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrozenParties {
    pub caller: bool,
    pub sender: bool,
    pub receiver: bool,
}

impl FrozenParties {
    /// Caller, sender, and receiver — the standard chain configuration.
    pub const ALL: Self = Self {
        caller: true,
        sender: true,
        receiver: true,
    };

    /// Sender and receiver only; the caller is not inspected.
    pub const SENDER_RECEIVER: Self = Self {
        caller: false,
        sender: true,
        receiver: true,
    };
}

impl Default for FrozenParties {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FreezeDelegate {
    pub parties: FrozenParties,
}

impl FreezeDelegate {
    pub fn new(parties: FrozenParties) -> Self {
        Self { parties }
    }
}

impl ComplianceDelegate for FreezeDelegate {
    fn name(&self) -> &'static str {
        "freeze"
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
        let frozen = (self.parties.caller && env.state.is_frozen(ctx.token, ctx.caller, ctx.now))
            || (self.parties.sender && env.state.is_frozen(ctx.token, ctx.from, ctx.now))
            || (self.parties.receiver && env.state.is_frozen(ctx.token, ctx.to, ctx.now));
        if frozen {
            return Ok(TransferCode::Frozen);
        }
        Ok(TransferCode::Ok)
    }
}
