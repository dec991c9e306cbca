//! The storage core — single persistent state owner for many tokens
//!
//! Every front-end invocation lands here. The core resolves the token's
//! delegate chain and executes the appropriate delegate's logic directly
//! against its own storage. Invocations are externally serialized (one at
//! a time per core, enforced by `&mut self`), metered against a bounded
//! budget, and all-or-nothing: any failure restores the pre-invocation
//! state snapshot, discarding every mutation and event of the attempt.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::address::{Address, AddressScope};
use types::errors::{AuditError, CoreError, RulesError};
use types::ids::{AuditScopeId, ChainId, DelegateId, RuleId, TokenId};
use types::outcome::TransferCode;

use crate::audit::{self, AuditRecord, AuditRecordKey, AuditScopeConfig};
use crate::compliance;
use crate::delegates::{Capability, CheckEnv, ComplianceDelegate, TransferContext};
use crate::events::{
    AddressesFrozen, ApprovalSet, AuditConfigured, ChainBound, CoreEvent, LockDefined,
    LockRemoved, RulesDefined, TokenDefined, TransferExecuted,
};
use crate::metering::{ExecutionMeter, COST_BALANCE_MUTATION, COST_DISPATCH, DEFAULT_BUDGET};
use crate::oracle::{IdentityRegistry, RatesOracle};
use crate::rules::{RuleSet, RuleValidator};
use crate::security::{AccessControl, PauseGuard, Role};
use crate::state::{CoreState, Lock, OwnershipProof, TokenInfo, TokenRecord};

/// The shared storage core.
///
/// Owns all token state plus the delegate and rule registries; consumes the
/// identity registry and rates oracle as opaque collaborators.
#[derive(Debug)]
pub struct Core {
    state: CoreState,
    delegates: HashMap<DelegateId, Box<dyn ComplianceDelegate>>,
    rules: RuleSet,
    identity: Box<dyn IdentityRegistry>,
    oracle: Box<dyn RatesOracle>,
    access: AccessControl,
    pause: PauseGuard,
    budget: u64,
    events: Vec<CoreEvent>,
}

impl Core {
    /// Create a core with an admin and its external collaborators.
    pub fn new(
        admin: impl Into<Address>,
        identity: Box<dyn IdentityRegistry>,
        oracle: Box<dyn RatesOracle>,
    ) -> Self {
        Self {
            state: CoreState::new(),
            delegates: HashMap::new(),
            rules: RuleSet::new(),
            identity,
            oracle,
            access: AccessControl::new(admin),
            pause: PauseGuard::new(),
            budget: DEFAULT_BUDGET,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Registries ─────────────────────────

    /// Register a compliance delegate implementation. Admin-only.
    ///
    /// At most one implementation per id; re-registration is rejected.
    pub fn register_delegate(
        &mut self,
        caller: &Address,
        id: DelegateId,
        delegate: Box<dyn ComplianceDelegate>,
    ) -> Result<(), CoreError> {
        self.require_admin(caller)?;
        if self.delegates.contains_key(&id) {
            return Err(CoreError::DelegateExists { delegate: id });
        }
        tracing::info!(delegate = %id, name = delegate.name(), "delegate registered");
        self.delegates.insert(id, delegate);
        Ok(())
    }

    /// Register a rule validator implementation. Admin-only.
    pub fn register_rule(
        &mut self,
        caller: &Address,
        id: RuleId,
        validator: Box<dyn RuleValidator>,
    ) -> Result<(), CoreError> {
        self.require_admin(caller)?;
        self.rules.register(id, validator);
        Ok(())
    }

    // ───────────────────────── Platform configuration ─────────────────────────

    /// Define a new logical token. Operator-only.
    ///
    /// The token starts disabled: bind a delegate chain before use.
    pub fn define_token(
        &mut self,
        caller: &Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Result<TokenId, CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        let token = TokenId::new();
        let name = name.into();
        let symbol = symbol.into();
        self.state.insert_token(
            token,
            TokenRecord {
                name: name.clone(),
                symbol: symbol.clone(),
                decimals,
                total_supply: Decimal::ZERO,
                minting_finished: false,
                chain: None,
                audit_scopes: Vec::new(),
                rules: Vec::new(),
            },
        );
        tracing::info!(%token, symbol, "token defined");
        self.events.push(CoreEvent::TokenDefined(TokenDefined {
            token,
            name,
            symbol,
            decimals,
        }));
        Ok(token)
    }

    /// Define (or replace) an ordered delegate chain. Operator-only.
    ///
    /// Every id must resolve to a registered delegate.
    pub fn define_delegate_chain(
        &mut self,
        caller: &Address,
        chain: ChainId,
        delegates: Vec<DelegateId>,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        for id in &delegates {
            if !self.delegates.contains_key(id) {
                return Err(CoreError::UnknownDelegate { delegate: *id });
            }
        }
        self.state.define_chain(chain, delegates);
        Ok(())
    }

    /// Bind a token to a delegate chain. Operator-only.
    pub fn set_token_chain(
        &mut self,
        caller: &Address,
        token: TokenId,
        chain: ChainId,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.state.chain(chain)?;
        self.state.token_mut(token)?.chain = Some(chain);
        self.events.push(CoreEvent::ChainBound(ChainBound {
            token,
            chain: Some(chain),
        }));
        Ok(())
    }

    /// Soft-disable a token by clearing its chain binding. Operator-only.
    ///
    /// Tokens are never deleted; a disabled token rejects every
    /// delegate-dispatched operation until rebound.
    pub fn disable_token(&mut self, caller: &Address, token: TokenId) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.state.token_mut(token)?.chain = None;
        self.events
            .push(CoreEvent::ChainBound(ChainBound { token, chain: None }));
        Ok(())
    }

    /// Replace a token's ordered rule validator list atomically. Operator-only.
    pub fn define_rules(
        &mut self,
        caller: &Address,
        token: TokenId,
        rules: Vec<RuleId>,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        for id in &rules {
            if !self.rules.contains(*id) {
                return Err(RulesError::UnknownRule { rule: *id }.into());
            }
        }
        self.state.token_mut(token)?.rules = rules.clone();
        self.events
            .push(CoreEvent::RulesDefined(RulesDefined { token, rules }));
        Ok(())
    }

    /// Define a transfer lock for a token. Operator-only.
    pub fn define_lock(
        &mut self,
        caller: &Address,
        token: TokenId,
        sender_scope: AddressScope,
        receiver_scope: AddressScope,
        start_at: i64,
        end_at: i64,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        if start_at >= end_at {
            return Err(CoreError::InvalidLockWindow { start_at, end_at });
        }
        self.state.token(token)?;
        self.state.add_lock(
            token,
            Lock {
                sender_scope: sender_scope.clone(),
                receiver_scope: receiver_scope.clone(),
                start_at,
                end_at,
            },
        );
        self.events.push(CoreEvent::LockDefined(LockDefined {
            token,
            sender_scope,
            receiver_scope,
            start_at,
            end_at,
        }));
        Ok(())
    }

    /// Remove a lock by index. Operator-only.
    pub fn remove_lock(
        &mut self,
        caller: &Address,
        token: TokenId,
        index: usize,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.state.remove_lock(token, index)?;
        self.events
            .push(CoreEvent::LockRemoved(LockRemoved { token, index }));
        Ok(())
    }

    /// Freeze a batch of addresses until a timestamp. Operator-only.
    pub fn freeze_many_addresses(
        &mut self,
        caller: &Address,
        token: TokenId,
        addresses: &[Address],
        until: i64,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.state.token(token)?;
        for address in addresses {
            self.state.set_frozen(token, address, until);
        }
        self.events.push(CoreEvent::AddressesFrozen(AddressesFrozen {
            token,
            addresses: addresses.to_vec(),
            until,
        }));
        Ok(())
    }

    /// Define (or replace) an audit scope configuration. Operator-only.
    pub fn define_audit_configuration(
        &mut self,
        caller: &Address,
        scope: AuditScopeId,
        config: AuditScopeConfig,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.state.set_audit_config(scope, config);
        self.events
            .push(CoreEvent::AuditConfigured(AuditConfigured { scope }));
        Ok(())
    }

    /// Bind audit scopes to a token. Operator-only.
    ///
    /// Every scope must already be configured.
    pub fn set_token_audit_scopes(
        &mut self,
        caller: &Address,
        token: TokenId,
        scopes: Vec<AuditScopeId>,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        for scope in &scopes {
            if self.state.audit_config(*scope).is_none() {
                return Err(AuditError::UnknownScope { scope: *scope }.into());
            }
        }
        self.state.token_mut(token)?.audit_scopes = scopes;
        Ok(())
    }

    // ───────────────────────── Public reads ─────────────────────────

    /// Public read view of a token.
    pub fn token_info(&self, token: TokenId) -> Result<TokenInfo, CoreError> {
        self.state.token_info(token)
    }

    /// Balance of a holder.
    pub fn balance_of(&self, token: TokenId, holder: &Address) -> Decimal {
        self.state.balance_of(token, holder)
    }

    /// Total supply of a token.
    pub fn total_supply(&self, token: TokenId) -> Result<Decimal, CoreError> {
        Ok(self.state.token(token)?.total_supply)
    }

    /// Approved amount a spender may move for an owner.
    pub fn allowance(&self, token: TokenId, owner: &Address, spender: &Address) -> Decimal {
        self.state.allowance(token, owner, spender)
    }

    /// Proofs created for a holder, in creation order.
    pub fn proofs(&self, token: TokenId, holder: &Address) -> &[OwnershipProof] {
        self.state.proofs(token, holder)
    }

    /// Read an audit record.
    pub fn audit_record(&self, key: &AuditRecordKey) -> Option<&AuditRecord> {
        self.state.audit_record(key)
    }

    /// Evaluate the transfer-permission pipeline without moving value.
    pub fn can_transfer(
        &self,
        token: TokenId,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<TransferCode, CoreError> {
        let mut meter = ExecutionMeter::new(self.budget);
        meter.charge(COST_DISPATCH)?;
        self.evaluate_transfer(token, caller, from, to, amount, now, &mut meter)
    }

    /// The full persistent state, for invariant inspection.
    pub fn state(&self) -> &CoreState {
        &self.state
    }

    /// All emitted events.
    pub fn events(&self) -> &[CoreEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Append an event to the log.
    pub(crate) fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    // ───────────────────────── Value movement ─────────────────────────

    /// Move value from the caller to a receiver.
    pub fn transfer(
        &mut self,
        token: TokenId,
        caller: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            core.execute_transfer(token, caller, caller, to, amount, now, meter)
        })
    }

    /// Move value from an owner on the strength of an allowance.
    ///
    /// The compliance pipeline sees the spender as the logical caller.
    pub fn transfer_from(
        &mut self,
        token: TokenId,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            core.state.consume_allowance(token, from, caller, amount)?;
            core.execute_transfer(token, caller, from, to, amount, now, meter)
        })
    }

    /// Approve a spender to move value on the caller's behalf.
    pub fn approve(
        &mut self,
        token: TokenId,
        caller: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> Result<(), CoreError> {
        self.check_not_paused()?;
        if amount < Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        self.state.token(token)?;
        self.state.set_allowance(token, caller, spender, amount);
        self.events.push(CoreEvent::ApprovalSet(ApprovalSet {
            token,
            owner: caller.clone(),
            spender: spender.clone(),
            amount,
        }));
        Ok(())
    }

    // ───────────────────────── Delegate-dispatched writes ─────────────────────────

    /// Mint new supply to each recipient. Operator-only.
    pub fn mint(
        &mut self,
        caller: &Address,
        token: TokenId,
        recipients: &[Address],
        amounts: &[Decimal],
        now: i64,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            meter.charge(COST_DISPATCH)?;
            let id = core.capable_delegate(token, Capability::Supply)?;
            // Field-level lookup keeps `core.state` free for the delegate.
            let delegate = core
                .delegates
                .get(&id)
                .map(|d| d.as_ref())
                .ok_or(CoreError::UnknownDelegate { delegate: id })?;
            let events = delegate.mint(
                &mut core.state,
                core.oracle.as_ref(),
                token,
                recipients,
                amounts,
                now,
                meter,
            )?;
            tracing::info!(%token, recipients = recipients.len(), "minted");
            core.events.extend(events);
            Ok(())
        })
    }

    /// Burn supply from the operator's own balance. Operator-only.
    pub fn burn(
        &mut self,
        caller: &Address,
        token: TokenId,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            meter.charge(COST_DISPATCH)?;
            let id = core.capable_delegate(token, Capability::Supply)?;
            let delegate = core
                .delegates
                .get(&id)
                .map(|d| d.as_ref())
                .ok_or(CoreError::UnknownDelegate { delegate: id })?;
            let event = delegate.burn(
                &mut core.state,
                core.oracle.as_ref(),
                token,
                caller,
                amount,
                now,
                meter,
            )?;
            core.events.push(event);
            Ok(())
        })
    }

    /// Permanently finish minting for a token. Operator-only, terminal.
    pub fn finish_minting(&mut self, caller: &Address, token: TokenId) -> Result<(), CoreError> {
        self.require_operator(caller)?;
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            meter.charge(COST_DISPATCH)?;
            let id = core.capable_delegate(token, Capability::Supply)?;
            let delegate = core
                .delegates
                .get(&id)
                .map(|d| d.as_ref())
                .ok_or(CoreError::UnknownDelegate { delegate: id })?;
            let event = delegate.finish_minting(&mut core.state, token)?;
            tracing::info!(%token, "minting finished");
            core.events.push(event);
            Ok(())
        })
    }

    /// Create an ownership-proof snapshot for a holder.
    pub fn create_proof(
        &mut self,
        token: TokenId,
        holder: &Address,
        now: i64,
    ) -> Result<u64, CoreError> {
        self.check_not_paused()?;
        self.transactional(|core, meter| {
            meter.charge(COST_DISPATCH)?;
            let id = core.capable_delegate(token, Capability::Proof)?;
            let delegate = core
                .delegates
                .get(&id)
                .map(|d| d.as_ref())
                .ok_or(CoreError::UnknownDelegate { delegate: id })?;
            let (proof_id, event) =
                delegate.create_proof(&mut core.state, token, holder, now, meter)?;
            core.events.push(event);
            Ok(proof_id)
        })
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Pause the core. Admin-only.
    pub fn pause(&mut self, caller: &Address) -> Result<(), CoreError> {
        self.require_admin(caller)?;
        self.pause.pause();
        Ok(())
    }

    /// Unpause the core. Admin-only.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), CoreError> {
        self.require_admin(caller)?;
        self.pause.unpause();
        Ok(())
    }

    /// Check if the core is paused.
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Grant the operator role. Admin-only.
    pub fn grant_operator(
        &mut self,
        caller: &Address,
        operator: impl Into<Address>,
    ) -> Result<(), CoreError> {
        if !self.access.grant_role(caller, operator, Role::Operator) {
            return Err(CoreError::NotAdmin {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    /// Revoke a role. Admin-only.
    pub fn revoke_role(&mut self, caller: &Address, target: &Address) -> Result<(), CoreError> {
        if !self.access.revoke_role(caller, target) {
            return Err(CoreError::NotAdmin {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    /// Replace the per-invocation execution budget. Admin-only.
    pub fn set_execution_budget(&mut self, caller: &Address, budget: u64) -> Result<(), CoreError> {
        self.require_admin(caller)?;
        self.budget = budget;
        Ok(())
    }

    /// Check whether an address may perform operator actions.
    pub fn is_operator(&self, address: &Address) -> bool {
        self.access.is_operator(address)
    }

    // ───────────────────────── Internals ─────────────────────────

    /// Run a mutating invocation all-or-nothing.
    ///
    /// Snapshots the state and the event mark; any error restores both, so
    /// a failed invocation leaves no trace.
    fn transactional<T>(
        &mut self,
        f: impl FnOnce(&mut Core, &mut ExecutionMeter) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let snapshot = self.state.clone();
        let events_mark = self.events.len();
        let mut meter = ExecutionMeter::new(self.budget);
        match f(self, &mut meter) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.state = snapshot;
                self.events.truncate(events_mark);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_transfer(
        &mut self,
        token: TokenId,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
        meter: &mut ExecutionMeter,
    ) -> Result<(), CoreError> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        meter.charge(COST_DISPATCH)?;
        let code = self.evaluate_transfer(token, caller, from, to, amount, now, meter)?;
        if !code.is_ok() {
            return Err(CoreError::TransferDenied { code });
        }

        meter.charge(COST_BALANCE_MUTATION)?;
        self.state.debit(token, from, amount)?;
        meter.charge(COST_BALANCE_MUTATION)?;
        self.state.credit(token, to, amount, now)?;
        audit::record_movement(
            &mut self.state,
            self.oracle.as_ref(),
            token,
            Some(from),
            Some(to),
            amount,
            now,
            meter,
        )?;

        self.events.push(CoreEvent::TransferExecuted(TransferExecuted {
            token,
            from: from.clone(),
            to: to.clone(),
            amount,
        }));
        Ok(())
    }

    /// Resolve the token's chain and walk its check stages in order.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_transfer(
        &self,
        token: TokenId,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
        now: i64,
        meter: &mut ExecutionMeter,
    ) -> Result<TransferCode, CoreError> {
        let ids = self.state.token_chain(token)?;
        let mut chain: Vec<&dyn ComplianceDelegate> = Vec::with_capacity(ids.len());
        for id in ids {
            chain.push(self.delegate(*id)?);
        }
        let env = CheckEnv {
            state: &self.state,
            identity: self.identity.as_ref(),
            rules: &self.rules,
        };
        let ctx = TransferContext {
            token,
            caller,
            from,
            to,
            amount,
            now,
        };
        compliance::evaluate_chain(&chain, &env, &ctx, meter)
    }

    /// First delegate in the token's chain providing a capability.
    fn capable_delegate(&self, token: TokenId, capability: Capability) -> Result<DelegateId, CoreError> {
        for id in self.state.token_chain(token)? {
            if self.delegate(*id)?.supports(capability) {
                return Ok(*id);
            }
        }
        Err(CoreError::CapabilityUnsupported {
            capability: format!("{capability:?}").to_lowercase(),
        })
    }

    fn delegate(&self, id: DelegateId) -> Result<&dyn ComplianceDelegate, CoreError> {
        self.delegates
            .get(&id)
            .map(|d| d.as_ref())
            .ok_or(CoreError::UnknownDelegate { delegate: id })
    }

    fn require_admin(&self, caller: &Address) -> Result<(), CoreError> {
        if !self.access.is_admin(caller) {
            return Err(CoreError::NotAdmin {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    fn require_operator(&self, caller: &Address) -> Result<(), CoreError> {
        if !self.access.is_operator(caller) {
            return Err(CoreError::NotOperator {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    fn check_not_paused(&self) -> Result<(), CoreError> {
        if self.pause.is_paused() {
            return Err(CoreError::Paused);
        }
        Ok(())
    }
}
