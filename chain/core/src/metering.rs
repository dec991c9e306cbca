//! Bounded per-invocation execution budget
//!
//! Every invocation is metered against a fixed budget of abstract cost
//! units. Exceeding the budget aborts the whole invocation, which then
//! rolls back like any other failure.

use types::errors::CoreError;

/// Default budget for one invocation.
pub const DEFAULT_BUDGET: u64 = 100_000;

/// Cost of resolving a token and its delegate chain.
pub const COST_DISPATCH: u64 = 10;
/// Cost of one delegate check stage.
pub const COST_CHECK_STAGE: u64 = 10;
/// Cost of evaluating one lock window.
pub const COST_LOCK_WINDOW: u64 = 5;
/// Cost of evaluating one rule validator.
pub const COST_RULE: u64 = 25;
/// Cost of one balance credit or debit.
pub const COST_BALANCE_MUTATION: u64 = 10;
/// Cost of updating one audit record side.
pub const COST_AUDIT_UPDATE: u64 = 20;
/// Cost of one oracle conversion.
pub const COST_CONVERSION: u64 = 50;
/// Cost of creating one ownership proof.
pub const COST_PROOF: u64 = 15;

/// Meter tracking cost units spent by the current invocation.
#[derive(Debug, Clone)]
pub struct ExecutionMeter {
    budget: u64,
    spent: u64,
}

impl ExecutionMeter {
    /// Create a meter with the given budget.
    pub fn new(budget: u64) -> Self {
        Self { budget, spent: 0 }
    }

    /// Charge `units` against the budget.
    ///
    /// Fails with `BudgetExhausted` once cumulative spend exceeds the
    /// budget; the invocation must then abort.
    pub fn charge(&mut self, units: u64) -> Result<(), CoreError> {
        self.spent = self.spent.saturating_add(units);
        if self.spent > self.budget {
            return Err(CoreError::BudgetExhausted {
                spent: self.spent,
                budget: self.budget,
            });
        }
        Ok(())
    }

    /// Units spent so far.
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Configured budget.
    pub fn budget(&self) -> u64 {
        self.budget
    }
}
