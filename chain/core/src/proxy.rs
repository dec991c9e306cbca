//! Stateless proxy front-end
//!
//! A proxy is bound at deployment to exactly one token on one core and
//! forwards every call unmodified. It holds no state of its own beyond the
//! immutable binding, so many cheap proxies can share one core.

use rust_decimal::Decimal;
use types::address::Address;
use types::errors::CoreError;
use types::ids::{RuleId, TokenId};
use types::outcome::TransferCode;

use crate::core::Core;
use crate::events::{CoreEvent, ProxyDeployed};
use crate::state::{OwnershipProof, TokenInfo};

/// Front-end bound to one token. The binding never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proxy {
    token: TokenId,
}

/// Deploy a proxy for a token, emitting `ProxyDeployed`.
///
/// Fails if the token does not exist on the core.
pub fn deploy_proxy(core: &mut Core, token: TokenId) -> Result<Proxy, CoreError> {
    core.token_info(token)?;
    tracing::info!(%token, "proxy deployed");
    core.push_event(CoreEvent::ProxyDeployed(ProxyDeployed { token }));
    Ok(Proxy { token })
}

impl Proxy {
    /// The token this proxy is bound to.
    pub fn token(&self) -> TokenId {
        self.token
    }

    // ───────────────────────── Reads ─────────────────────────

    pub fn token_info(&self, core: &Core) -> Result<TokenInfo, CoreError> {
        core.token_info(self.token)
    }

    pub fn balance_of(&self, core: &Core, holder: &Address) -> Decimal {
        core.balance_of(self.token, holder)
    }

    pub fn total_supply(&self, core: &Core) -> Result<Decimal, CoreError> {
        core.total_supply(self.token)
    }

    pub fn allowance(&self, core: &Core, owner: &Address, spender: &Address) -> Decimal {
        core.allowance(self.token, owner, spender)
    }

    pub fn proofs<'a>(&self, core: &'a Core, holder: &Address) -> &'a [OwnershipProof] {
        core.proofs(self.token, holder)
    }

    pub fn can_transfer(
        &self,
        core: &Core,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<TransferCode, CoreError> {
        core.can_transfer(self.token, from, from, to, amount, now)
    }

    // ───────────────────────── Writes ─────────────────────────

    pub fn transfer(
        &self,
        core: &mut Core,
        caller: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        core.transfer(self.token, caller, to, amount, now)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transfer_from(
        &self,
        core: &mut Core,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        core.transfer_from(self.token, caller, from, to, amount, now)
    }

    pub fn approve(
        &self,
        core: &mut Core,
        caller: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> Result<(), CoreError> {
        core.approve(self.token, caller, spender, amount)
    }

    pub fn mint(
        &self,
        core: &mut Core,
        caller: &Address,
        recipients: &[Address],
        amounts: &[Decimal],
        now: i64,
    ) -> Result<(), CoreError> {
        core.mint(caller, self.token, recipients, amounts, now)
    }

    pub fn burn(
        &self,
        core: &mut Core,
        caller: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        core.burn(caller, self.token, amount, now)
    }

    pub fn finish_minting(&self, core: &mut Core, caller: &Address) -> Result<(), CoreError> {
        core.finish_minting(caller, self.token)
    }

    pub fn define_rules(
        &self,
        core: &mut Core,
        caller: &Address,
        rules: Vec<RuleId>,
    ) -> Result<(), CoreError> {
        core.define_rules(caller, self.token, rules)
    }

    pub fn create_proof(
        &self,
        core: &mut Core,
        holder: &Address,
        now: i64,
    ) -> Result<u64, CoreError> {
        core.create_proof(self.token, holder, now)
    }
}
