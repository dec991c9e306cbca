//! Audit ledger — cumulative-flow bookkeeping with currency conversion
//!
//! Every value-moving operation (transfer, mint, burn) updates the audit
//! records of each scope bound to the token, provided the scope's trigger
//! matches the side of the movement. Updates happen inside the same
//! invocation as the balance mutation, so they commit and roll back
//! together.
//!
//! When a scope configures a reference currency, the moved amount is
//! additionally converted via the rates oracle and accumulated into the
//! currency-denominated fields. An unavailable rate skips only those
//! fields; base-unit accumulation always proceeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::address::Address;
use types::errors::{AuditError, CoreError};
use types::ids::{AuditScopeId, TokenId};

use crate::metering::{ExecutionMeter, COST_AUDIT_UPDATE, COST_CONVERSION};
use crate::oracle::RatesOracle;
use crate::state::CoreState;

/// Which sides of a movement trigger an update for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Never updates
    None,
    /// Updates only the sender's record
    SenderOnly,
    /// Updates only the receiver's record
    ReceiverOnly,
    /// Updates both records
    Both,
}

impl TriggerMode {
    fn matches_sender(&self) -> bool {
        matches!(self, TriggerMode::SenderOnly | TriggerMode::Both)
    }

    fn matches_receiver(&self) -> bool {
        matches!(self, TriggerMode::ReceiverOnly | TriggerMode::Both)
    }
}

/// How records of a scope are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// One record per (token, holder)
    PerToken,
    /// One record per holder, shared across every token bound to the scope
    Shared,
}

/// Which fields of a record the scope actually writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFields {
    pub created_at: bool,
    pub last_transaction_at: bool,
    pub cumulative_received: bool,
    pub cumulative_sent: bool,
    pub cumulative_received_currency: bool,
    pub cumulative_sent_currency: bool,
}

impl RecordedFields {
    /// Every field recorded.
    pub const ALL: Self = Self {
        created_at: true,
        last_transaction_at: true,
        cumulative_received: true,
        cumulative_sent: true,
        cumulative_received_currency: true,
        cumulative_sent_currency: true,
    };

    /// Timestamps only, no cumulative flow.
    pub const TIMESTAMPS: Self = Self {
        created_at: true,
        last_transaction_at: true,
        cumulative_received: false,
        cumulative_sent: false,
        cumulative_received_currency: false,
        cumulative_sent_currency: false,
    };
}

/// Configuration of one audit scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditScopeConfig {
    pub trigger: TriggerMode,
    pub storage: StorageMode,
    pub fields: RecordedFields,
    /// Reference currency for converted accumulation; `None` disables
    /// currency bookkeeping for this scope.
    pub currency: Option<String>,
}

/// Key of one audit record.
///
/// `token` is `None` for scopes with `StorageMode::Shared`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditRecordKey {
    pub scope: AuditScopeId,
    pub token: Option<TokenId>,
    pub holder: Address,
}

/// One audit record: timestamps plus cumulative flow, in base units and in
/// the scope's reference currency.
///
/// `created_at == 0` means the record has never been written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub created_at: i64,
    pub last_transaction_at: i64,
    pub cumulative_received: Decimal,
    pub cumulative_sent: Decimal,
    pub cumulative_received_currency: Decimal,
    pub cumulative_sent_currency: Decimal,
}

/// Side of a movement being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Sent,
    Received,
}

/// Record a value movement against every audit scope bound to the token.
///
/// `from` is `None` for mints, `to` is `None` for burns.
pub fn record_movement(
    state: &mut CoreState,
    oracle: &dyn RatesOracle,
    token: TokenId,
    from: Option<&Address>,
    to: Option<&Address>,
    amount: Decimal,
    now: i64,
    meter: &mut ExecutionMeter,
) -> Result<(), CoreError> {
    let scopes = state.token(token)?.audit_scopes.clone();
    for scope in scopes {
        let config = state
            .audit_config(scope)
            .ok_or(AuditError::UnknownScope { scope })?
            .clone();

        if let Some(sender) = from {
            if config.trigger.matches_sender() {
                update_record(state, oracle, &config, scope, token, sender, Side::Sent, amount, now, meter)?;
            }
        }
        if let Some(receiver) = to {
            if config.trigger.matches_receiver() {
                update_record(state, oracle, &config, scope, token, receiver, Side::Received, amount, now, meter)?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn update_record(
    state: &mut CoreState,
    oracle: &dyn RatesOracle,
    config: &AuditScopeConfig,
    scope: AuditScopeId,
    token: TokenId,
    holder: &Address,
    side: Side,
    amount: Decimal,
    now: i64,
    meter: &mut ExecutionMeter,
) -> Result<(), CoreError> {
    meter.charge(COST_AUDIT_UPDATE)?;

    let wants_currency = match side {
        Side::Sent => config.fields.cumulative_sent_currency,
        Side::Received => config.fields.cumulative_received_currency,
    };
    let converted = match (&config.currency, wants_currency) {
        (Some(currency), true) => {
            meter.charge(COST_CONVERSION)?;
            oracle.convert(amount, currency)
        }
        _ => None,
    };

    let key = AuditRecordKey {
        scope,
        token: match config.storage {
            StorageMode::PerToken => Some(token),
            StorageMode::Shared => None,
        },
        holder: holder.clone(),
    };

    let fields = config.fields;
    let record = state.audit_record_entry(key);

    if fields.created_at && record.created_at == 0 {
        record.created_at = now;
    }
    if fields.last_transaction_at {
        record.last_transaction_at = now;
    }
    match side {
        Side::Sent => {
            if fields.cumulative_sent {
                record.cumulative_sent = record
                    .cumulative_sent
                    .checked_add(amount)
                    .ok_or(AuditError::Overflow)?;
            }
            if let Some(converted) = converted {
                record.cumulative_sent_currency = record
                    .cumulative_sent_currency
                    .checked_add(converted)
                    .ok_or(AuditError::Overflow)?;
            }
        }
        Side::Received => {
            if fields.cumulative_received {
                record.cumulative_received = record
                    .cumulative_received
                    .checked_add(amount)
                    .ok_or(AuditError::Overflow)?;
            }
            if let Some(converted) = converted {
                record.cumulative_received_currency = record
                    .cumulative_received_currency
                    .checked_add(converted)
                    .ok_or(AuditError::Overflow)?;
            }
        }
    }
    Ok(())
}
