//! Persistent token state owned by the core
//!
//! One `CoreState` holds the balances, allowances, configuration, and
//! bookkeeping for every logical token on the platform. Delegates operate
//! directly on this shared state; nothing here hands out private copies.
//!
//! All balance arithmetic is checked. A credit that would overflow or a
//! debit that would underflow surfaces an error instead of wrapping.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::address::{Address, AddressScope};
use types::errors::CoreError;
use types::ids::{AuditScopeId, ChainId, DelegateId, RuleId, TokenId};

use crate::audit::{AuditRecord, AuditRecordKey, AuditScopeConfig};

/// Configuration and supply state of one logical token.
///
/// A token with no chain bound is disabled: every delegate-dispatched
/// operation on it fails. Tokens are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Decimal,
    pub minting_finished: bool,
    /// Delegate chain bound to this token; `None` means disabled.
    pub chain: Option<ChainId>,
    /// Audit scopes updated on every value-moving operation.
    pub audit_scopes: Vec<AuditScopeId>,
    /// Ordered rule validators, evaluated left to right.
    pub rules: Vec<RuleId>,
}

/// Public read view of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Decimal,
    pub minting_finished: bool,
}

/// Time-boxed transfer restriction.
///
/// Blocks any transfer whose sender and receiver both match the scopes
/// while `now` lies in the half-open window `[start_at, end_at)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    pub sender_scope: AddressScope,
    pub receiver_scope: AddressScope,
    pub start_at: i64,
    pub end_at: i64,
}

impl Lock {
    /// Whether this lock blocks a transfer from `from` to `to` at `now`.
    pub fn blocks(&self, from: &Address, to: &Address, now: i64) -> bool {
        self.sender_scope.matches(from)
            && self.receiver_scope.matches(to)
            && self.start_at <= now
            && now < self.end_at
    }
}

/// Immutable snapshot of a holder's balance over a bounded window.
///
/// Windows of consecutive proofs for one holder are contiguous and never
/// overlap. Proofs are sequentially numbered per holder, starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipProof {
    pub amount: Decimal,
    pub start_at: i64,
    pub end_at: i64,
}

/// The single persistent state store for all logical tokens.
///
/// Contains only data — no trait objects — so an invocation snapshot is a
/// plain `clone()` and rollback is a plain assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreState {
    tokens: HashMap<TokenId, TokenRecord>,
    balances: HashMap<(TokenId, Address), Decimal>,
    allowances: HashMap<(TokenId, Address, Address), Decimal>,
    locks: HashMap<TokenId, Vec<Lock>>,
    freezes: HashMap<(TokenId, Address), i64>,
    chains: HashMap<ChainId, Vec<DelegateId>>,
    audit_configs: HashMap<AuditScopeId, AuditScopeConfig>,
    audit_records: HashMap<AuditRecordKey, AuditRecord>,
    proofs: HashMap<(TokenId, Address), Vec<OwnershipProof>>,
    /// First time a holder appeared for a token; anchors the first proof window.
    first_seen: HashMap<(TokenId, Address), i64>,
}

impl CoreState {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Tokens ─────────────────────────

    /// Insert a new token record.
    pub fn insert_token(&mut self, id: TokenId, record: TokenRecord) {
        self.tokens.insert(id, record);
    }

    /// Resolve a token or fail.
    pub fn token(&self, id: TokenId) -> Result<&TokenRecord, CoreError> {
        self.tokens.get(&id).ok_or(CoreError::UnknownToken { token: id })
    }

    /// Resolve a token mutably or fail.
    pub fn token_mut(&mut self, id: TokenId) -> Result<&mut TokenRecord, CoreError> {
        self.tokens
            .get_mut(&id)
            .ok_or(CoreError::UnknownToken { token: id })
    }

    /// Public read view of a token.
    pub fn token_info(&self, id: TokenId) -> Result<TokenInfo, CoreError> {
        let record = self.token(id)?;
        Ok(TokenInfo {
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            decimals: record.decimals,
            total_supply: record.total_supply,
            minting_finished: record.minting_finished,
        })
    }

    // ───────────────────────── Delegate chains ─────────────────────────

    /// Define (or replace) a delegate chain.
    pub fn define_chain(&mut self, id: ChainId, delegates: Vec<DelegateId>) {
        self.chains.insert(id, delegates);
    }

    /// Resolve a chain or fail.
    pub fn chain(&self, id: ChainId) -> Result<&[DelegateId], CoreError> {
        self.chains
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(CoreError::UnknownChain { chain: id })
    }

    /// Resolve the chain bound to a token, failing if the token is unknown
    /// or disabled.
    pub fn token_chain(&self, token: TokenId) -> Result<&[DelegateId], CoreError> {
        let record = self.token(token)?;
        let chain = record.chain.ok_or(CoreError::TokenDisabled { token })?;
        self.chain(chain)
    }

    // ───────────────────────── Balances ─────────────────────────

    /// Balance of a holder for a token. Unknown holders have zero.
    pub fn balance_of(&self, token: TokenId, holder: &Address) -> Decimal {
        self.balances
            .get(&(token, holder.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Credit a holder with overflow protection.
    ///
    /// Records the holder's first-seen time on first write, anchoring the
    /// start of their first ownership-proof window.
    pub fn credit(
        &mut self,
        token: TokenId,
        holder: &Address,
        amount: Decimal,
        now: i64,
    ) -> Result<(), CoreError> {
        let key = (token, holder.clone());
        self.first_seen.entry(key.clone()).or_insert(now);
        let current = self.balances.entry(key).or_insert(Decimal::ZERO);
        *current = current.checked_add(amount).ok_or(CoreError::Overflow)?;
        Ok(())
    }

    /// Debit a holder with underflow protection.
    pub fn debit(
        &mut self,
        token: TokenId,
        holder: &Address,
        amount: Decimal,
    ) -> Result<(), CoreError> {
        let key = (token, holder.clone());
        let current = self.balances.get_mut(&key).ok_or_else(|| {
            CoreError::InsufficientBalance {
                required: amount.to_string(),
                available: "0".to_string(),
            }
        })?;
        if *current < amount {
            return Err(CoreError::InsufficientBalance {
                required: amount.to_string(),
                available: current.to_string(),
            });
        }
        *current = current.checked_sub(amount).ok_or(CoreError::Overflow)?;
        Ok(())
    }

    /// Sum of all balances for a token. Must equal its total supply.
    pub fn sum_balances(&self, token: TokenId) -> Decimal {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .map(|(_, amount)| *amount)
            .sum()
    }

    // ───────────────────────── Allowances ─────────────────────────

    /// Approved amount a spender may move on behalf of an owner.
    pub fn allowance(&self, token: TokenId, owner: &Address, spender: &Address) -> Decimal {
        self.allowances
            .get(&(token, owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Replace an allowance.
    pub fn set_allowance(
        &mut self,
        token: TokenId,
        owner: &Address,
        spender: &Address,
        amount: Decimal,
    ) {
        self.allowances
            .insert((token, owner.clone(), spender.clone()), amount);
    }

    /// Consume part of an allowance, failing if not enough is approved.
    pub fn consume_allowance(
        &mut self,
        token: TokenId,
        owner: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> Result<(), CoreError> {
        let key = (token, owner.clone(), spender.clone());
        let approved = self.allowances.get_mut(&key).ok_or_else(|| {
            CoreError::InsufficientAllowance {
                required: amount.to_string(),
                approved: "0".to_string(),
            }
        })?;
        if *approved < amount {
            return Err(CoreError::InsufficientAllowance {
                required: amount.to_string(),
                approved: approved.to_string(),
            });
        }
        *approved = approved.checked_sub(amount).ok_or(CoreError::Overflow)?;
        Ok(())
    }

    // ───────────────────────── Locks ─────────────────────────

    /// Locks bound to a token.
    pub fn locks(&self, token: TokenId) -> &[Lock] {
        self.locks.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a lock.
    pub fn add_lock(&mut self, token: TokenId, lock: Lock) {
        self.locks.entry(token).or_default().push(lock);
    }

    /// Remove a lock by index.
    pub fn remove_lock(&mut self, token: TokenId, index: usize) -> Result<Lock, CoreError> {
        let locks = self.locks.entry(token).or_default();
        if index >= locks.len() {
            return Err(CoreError::UnknownLock { index });
        }
        Ok(locks.remove(index))
    }

    // ───────────────────────── Freezes ─────────────────────────

    /// Timestamp until which an address is frozen. Zero means never frozen.
    pub fn frozen_until(&self, token: TokenId, address: &Address) -> i64 {
        self.freezes
            .get(&(token, address.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Freeze an address until the given timestamp.
    pub fn set_frozen(&mut self, token: TokenId, address: &Address, until: i64) {
        self.freezes.insert((token, address.clone()), until);
    }

    /// Whether an address is frozen at `now`.
    pub fn is_frozen(&self, token: TokenId, address: &Address, now: i64) -> bool {
        self.frozen_until(token, address) > now
    }

    // ───────────────────────── Audit ─────────────────────────

    /// Define (or replace) an audit scope configuration.
    pub fn set_audit_config(&mut self, scope: AuditScopeId, config: AuditScopeConfig) {
        self.audit_configs.insert(scope, config);
    }

    /// Look up an audit scope configuration.
    pub fn audit_config(&self, scope: AuditScopeId) -> Option<&AuditScopeConfig> {
        self.audit_configs.get(&scope)
    }

    /// Read an audit record.
    pub fn audit_record(&self, key: &AuditRecordKey) -> Option<&AuditRecord> {
        self.audit_records.get(key)
    }

    /// Mutable audit record, created empty on first access.
    pub(crate) fn audit_record_entry(&mut self, key: AuditRecordKey) -> &mut AuditRecord {
        self.audit_records.entry(key).or_default()
    }

    // ───────────────────────── Ownership proofs ─────────────────────────

    /// Proofs created for a holder, in creation order.
    pub fn proofs(&self, token: TokenId, holder: &Address) -> &[OwnershipProof] {
        self.proofs
            .get(&(token, holder.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a proof, returning its sequential id.
    pub(crate) fn push_proof(
        &mut self,
        token: TokenId,
        holder: &Address,
        proof: OwnershipProof,
    ) -> u64 {
        let proofs = self.proofs.entry((token, holder.clone())).or_default();
        proofs.push(proof);
        (proofs.len() - 1) as u64
    }

    /// First time a holder appeared for a token.
    pub fn first_seen(&self, token: TokenId, holder: &Address) -> Option<i64> {
        self.first_seen.get(&(token, holder.clone())).copied()
    }
}
