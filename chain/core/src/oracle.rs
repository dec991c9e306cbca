//! Consumed external interfaces
//!
//! The core treats the identity/KYC registry and the rates oracle as opaque
//! collaborators behind traits. Production deployments wire in adapters to
//! the real services; tests use the in-memory implementations below.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;
use types::address::Address;

/// Identity/KYC registry consumed by the registry-validity check and by
/// entity-level rules.
pub trait IdentityRegistry: fmt::Debug {
    /// Whether the address is a recognized, valid participant.
    fn is_valid(&self, address: &Address) -> bool;
}

/// Rates/currency oracle consumed by the audit ledger when currency
/// conversion is configured.
pub trait RatesOracle: fmt::Debug {
    /// Convert `amount` of base units into the reference currency at the
    /// current rate. `None` means no rate is available; the caller skips
    /// currency-denominated bookkeeping for that update.
    fn convert(&self, amount: Decimal, currency: &str) -> Option<Decimal>;
}

/// In-memory identity registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    valid: HashSet<Address>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address as a valid participant.
    pub fn register(&mut self, address: impl Into<Address>) {
        self.valid.insert(address.into());
    }

    /// Remove an address from the registry.
    pub fn unregister(&mut self, address: &Address) {
        self.valid.remove(address);
    }
}

impl IdentityRegistry for MemoryRegistry {
    fn is_valid(&self, address: &Address) -> bool {
        self.valid.contains(address)
    }
}

/// Fixed-rate oracle: one static rate per currency code.
#[derive(Debug, Clone, Default)]
pub struct FixedRateOracle {
    rates: HashMap<String, Decimal>,
}

impl FixedRateOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate for a currency code.
    pub fn set_rate(&mut self, currency: impl Into<String>, rate: Decimal) {
        self.rates.insert(currency.into(), rate);
    }
}

impl RatesOracle for FixedRateOracle {
    fn convert(&self, amount: Decimal, currency: &str) -> Option<Decimal> {
        let rate = self.rates.get(currency)?;
        amount.checked_mul(*rate)
    }
}

/// Oracle that never has a rate. Used when no conversion is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRatesOracle;

impl RatesOracle for NoRatesOracle {
    fn convert(&self, _amount: Decimal, _currency: &str) -> Option<Decimal> {
        None
    }
}
