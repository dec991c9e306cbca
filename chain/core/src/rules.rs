//! Composable boolean rule validators
//!
//! Rules are independently deployed validators, stateless from the core's
//! perspective. Each token carries an ordered list of rule ids; a transfer
//! is permitted by the rule stage only if every validator in the list
//! accepts it. Evaluation short-circuits on the first rejection — the
//! permit/deny outcome is a logical AND either way, but short-circuiting
//! keeps the metered cost of an early rejection low.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use types::address::Address;
use types::errors::{CoreError, RulesError};
use types::ids::RuleId;

use crate::metering::{ExecutionMeter, COST_RULE};

/// A single boolean transfer validator.
pub trait RuleValidator: fmt::Debug {
    /// Whether the transfer `(from, to, amount)` is acceptable.
    fn is_transfer_valid(&self, from: &Address, to: &Address, amount: Decimal) -> bool;
}

/// Registry of rule validator implementations, keyed by rule id.
#[derive(Debug, Default)]
pub struct RuleSet {
    validators: HashMap<RuleId, Box<dyn RuleValidator>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator under an id, replacing any previous one.
    pub fn register(&mut self, id: RuleId, validator: Box<dyn RuleValidator>) {
        self.validators.insert(id, validator);
    }

    /// Whether an id resolves to a validator.
    pub fn contains(&self, id: RuleId) -> bool {
        self.validators.contains_key(&id)
    }

    /// Evaluate an ordered rule list left to right.
    ///
    /// Returns `Ok(false)` on the first rejecting validator without
    /// evaluating (or charging for) the rest. An id with no registered
    /// validator fails the whole invocation.
    pub fn evaluate(
        &self,
        rules: &[RuleId],
        from: &Address,
        to: &Address,
        amount: Decimal,
        meter: &mut ExecutionMeter,
    ) -> Result<bool, CoreError> {
        for id in rules {
            meter.charge(COST_RULE)?;
            let validator = self
                .validators
                .get(id)
                .ok_or(RulesError::UnknownRule { rule: *id })?;
            if !validator.is_transfer_valid(from, to, amount) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Validator that accepts every transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValidRule;

impl RuleValidator for AlwaysValidRule {
    fn is_transfer_valid(&self, _from: &Address, _to: &Address, _amount: Decimal) -> bool {
        true
    }
}

/// Validator capping the size of a single transfer.
#[derive(Debug, Clone, Copy)]
pub struct MaxTransferRule {
    pub max: Decimal,
}

impl RuleValidator for MaxTransferRule {
    fn is_transfer_valid(&self, _from: &Address, _to: &Address, amount: Decimal) -> bool {
        amount <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metering::DEFAULT_BUDGET;

    /// Test validator counting how often it runs.
    #[derive(Debug)]
    struct CountingRule {
        accept: bool,
        calls: std::cell::Cell<usize>,
    }

    impl CountingRule {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                calls: std::cell::Cell::new(0),
            }
        }
    }

    impl RuleValidator for CountingRule {
        fn is_transfer_valid(&self, _from: &Address, _to: &Address, _amount: Decimal) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.accept
        }
    }

    fn meter() -> ExecutionMeter {
        ExecutionMeter::new(DEFAULT_BUDGET)
    }

    #[test]
    fn test_empty_rule_list_accepts() {
        let rules = RuleSet::new();
        let ok = rules
            .evaluate(&[], &"a".into(), &"b".into(), Decimal::ONE, &mut meter())
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn test_all_accepting_rules_pass() {
        let mut rules = RuleSet::new();
        rules.register(RuleId::new(1), Box::new(AlwaysValidRule));
        rules.register(
            RuleId::new(2),
            Box::new(MaxTransferRule {
                max: Decimal::from(100),
            }),
        );
        let ok = rules
            .evaluate(
                &[RuleId::new(1), RuleId::new(2)],
                &"a".into(),
                &"b".into(),
                Decimal::from(100),
                &mut meter(),
            )
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn test_max_transfer_rejects_above_cap() {
        let mut rules = RuleSet::new();
        rules.register(
            RuleId::new(1),
            Box::new(MaxTransferRule {
                max: Decimal::from(100),
            }),
        );
        let ok = rules
            .evaluate(
                &[RuleId::new(1)],
                &"a".into(),
                &"b".into(),
                Decimal::from(101),
                &mut meter(),
            )
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_unknown_rule_fails_invocation() {
        let rules = RuleSet::new();
        let err = rules
            .evaluate(&[RuleId::new(9)], &"a".into(), &"b".into(), Decimal::ONE, &mut meter())
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Rules(RulesError::UnknownRule {
                rule: RuleId::new(9)
            })
        );
    }

    #[test]
    fn test_short_circuit_on_first_rejection() {
        let mut rules = RuleSet::new();
        rules.register(RuleId::new(1), Box::new(CountingRule::new(false)));
        rules.register(RuleId::new(2), Box::new(CountingRule::new(true)));

        let mut m = meter();
        let ok = rules
            .evaluate(
                &[RuleId::new(1), RuleId::new(2)],
                &"a".into(),
                &"b".into(),
                Decimal::ONE,
                &mut m,
            )
            .unwrap();
        assert!(!ok);
        // Only the first validator was charged for.
        assert_eq!(m.spent(), COST_RULE);
    }

    #[test]
    fn test_rule_budget_exhaustion() {
        let mut rules = RuleSet::new();
        rules.register(RuleId::new(1), Box::new(AlwaysValidRule));
        let mut m = ExecutionMeter::new(COST_RULE - 1);
        let err = rules
            .evaluate(&[RuleId::new(1)], &"a".into(), &"b".into(), Decimal::ONE, &mut m)
            .unwrap_err();
        assert!(matches!(err, CoreError::BudgetExhausted { .. }));
    }
}
