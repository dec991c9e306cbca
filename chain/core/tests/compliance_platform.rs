//! Platform-level adversarial tests
//!
//! Exercises the contracts the platform guarantees end to end:
//! - Denial-code precedence (lock beats freeze beats rule beats registry)
//! - Supply invariant across mint/transfer/burn
//! - Terminal minting state
//! - Audit accumulation and currency conversion
//! - Ownership-proof window contiguity
//! - All-or-nothing rollback, including budget exhaustion
//! - Operator authorization

use proptest::prelude::*;
use rust_decimal::Decimal;
use token_core::audit::{
    AuditRecordKey, AuditScopeConfig, RecordedFields, StorageMode, TriggerMode,
};
use token_core::core::Core;
use token_core::delegates::{
    self, ComplianceDelegate, FreezeDelegate, FrozenParties, KycDelegate, LockDelegate,
    ProofDelegate, SupplyDelegate,
};
use token_core::oracle::{FixedRateOracle, MemoryRegistry, NoRatesOracle, RatesOracle};
use token_core::proxy::deploy_proxy;
use token_core::rules::MaxTransferRule;
use token_core::unix_now;
use types::address::{Address, AddressScope};
use types::errors::{CoreError, SupplyError};
use types::ids::{AuditScopeId, ChainId, DelegateId, RuleId, TokenId};
use types::outcome::TransferCode;

const T: i64 = 1_700_000_000;
const DAY: i64 = 86_400;

fn addr(s: &str) -> Address {
    Address::from(s)
}

fn admin() -> Address {
    addr("admin")
}

/// Core with the standard delegate chain, registered holders, a max-transfer
/// rule available under id 1, and one enabled token.
fn setup() -> (Core, TokenId) {
    setup_with_oracle(Box::new(NoRatesOracle))
}

fn setup_with_oracle(oracle: Box<dyn RatesOracle>) -> (Core, TokenId) {
    let mut identity = MemoryRegistry::new();
    for holder in ["alice", "bob", "carol"] {
        identity.register(holder);
    }
    let mut core = Core::new(admin(), Box::new(identity), oracle);

    let mut ids = Vec::new();
    for (id, delegate) in delegates::standard() {
        core.register_delegate(&admin(), id, delegate).unwrap();
        ids.push(id);
    }
    core.define_delegate_chain(&admin(), ChainId::new(1), ids).unwrap();
    core.register_rule(
        &admin(),
        RuleId::new(1),
        Box::new(MaxTransferRule {
            max: Decimal::from(1_000),
        }),
    )
    .unwrap();

    let token = core.define_token(&admin(), "Regulated Share", "RGS", 0).unwrap();
    core.set_token_chain(&admin(), token, ChainId::new(1)).unwrap();
    (core, token)
}

fn mint(core: &mut Core, token: TokenId, holder: &str, amount: u64) {
    core.mint(&admin(), token, &[addr(holder)], &[Decimal::from(amount)], T - 10 * DAY)
        .unwrap();
}

fn can(core: &Core, token: TokenId, from: &str, to: &str, amount: u64, now: i64) -> TransferCode {
    core.can_transfer(
        token,
        &addr(from),
        &addr(from),
        &addr(to),
        Decimal::from(amount),
        now,
    )
    .unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Denial-code precedence
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_clean_transfer_is_ok() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    assert_eq!(can(&core, token, "alice", "bob", 10, T), TransferCode::Ok);
}

#[test]
fn test_lock_beats_freeze() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    core.define_lock(&admin(), token, AddressScope::Any, AddressScope::Any, T - DAY, T + DAY)
        .unwrap();
    core.freeze_many_addresses(&admin(), token, &[addr("bob")], T + DAY).unwrap();

    // Both conditions hold; the earliest-evaluated one is reported.
    assert_eq!(can(&core, token, "alice", "bob", 10, T), TransferCode::Locked);
}

#[test]
fn test_freeze_beats_rule() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 5_000);
    core.freeze_many_addresses(&admin(), token, &[addr("bob")], T + DAY).unwrap();
    core.define_rules(&admin(), token, vec![RuleId::new(1)]).unwrap();

    // Amount 2000 violates the max-transfer rule, but bob is frozen.
    assert_eq!(can(&core, token, "alice", "bob", 2_000, T), TransferCode::Frozen);
}

#[test]
fn test_rule_beats_registry() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 5_000);
    core.define_rules(&admin(), token, vec![RuleId::new(1)]).unwrap();

    // "dave" is unregistered AND the amount exceeds the rule cap.
    assert_eq!(
        can(&core, token, "alice", "dave", 2_000, T),
        TransferCode::RuleRejected
    );
}

#[test]
fn test_sender_registration_beats_receiver() {
    let (core, token) = setup();
    assert_eq!(
        can(&core, token, "dave", "erin", 10, T),
        TransferCode::NonRegisteredSender
    );
    assert_eq!(
        can(&core, token, "alice", "erin", 10, T),
        TransferCode::NonRegisteredReceiver
    );
}

#[test]
fn test_full_precedence_stack() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 5_000);
    // Stack all four denial conditions at once.
    core.define_lock(&admin(), token, AddressScope::Any, AddressScope::Any, T - DAY, T + DAY)
        .unwrap();
    core.freeze_many_addresses(&admin(), token, &[addr("alice")], T + DAY).unwrap();
    core.define_rules(&admin(), token, vec![RuleId::new(1)]).unwrap();

    assert_eq!(can(&core, token, "alice", "dave", 2_000, T), TransferCode::Locked);

    // Peel the lock off: freeze is next.
    core.remove_lock(&admin(), token, 0).unwrap();
    assert_eq!(can(&core, token, "alice", "dave", 2_000, T), TransferCode::Frozen);

    // Thaw alice: the rule is next.
    core.freeze_many_addresses(&admin(), token, &[addr("alice")], 0).unwrap();
    assert_eq!(
        can(&core, token, "alice", "dave", 2_000, T),
        TransferCode::RuleRejected
    );

    // Drop the rules: the registry check remains.
    core.define_rules(&admin(), token, vec![]).unwrap();
    assert_eq!(
        can(&core, token, "alice", "dave", 2_000, T),
        TransferCode::NonRegisteredReceiver
    );
}

#[test]
fn test_lock_window_scenario() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    core.define_lock(&admin(), token, AddressScope::Any, AddressScope::Any, T - DAY, T + DAY)
        .unwrap();
    assert_eq!(can(&core, token, "alice", "bob", 10, T), TransferCode::Locked);

    // Removing the lock restores permission with no other condition present.
    core.remove_lock(&admin(), token, 0).unwrap();
    assert_eq!(can(&core, token, "alice", "bob", 10, T), TransferCode::Ok);
}

#[test]
fn test_wall_clock_freeze_window() {
    // Callers without an injected clock use the wall-clock helper.
    let (mut core, token) = setup();
    let now = unix_now();
    core.mint(&admin(), token, &[addr("alice")], &[Decimal::from(100)], now).unwrap();
    core.freeze_many_addresses(&admin(), token, &[addr("bob")], now + DAY).unwrap();

    assert_eq!(can(&core, token, "alice", "bob", 10, now), TransferCode::Frozen);
    core.transfer(token, &addr("alice"), &addr("carol"), Decimal::from(10), now).unwrap();
    assert_eq!(core.balance_of(token, &addr("carol")), Decimal::from(10));
}

#[test]
fn test_freeze_checks_logical_caller() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    core.approve(token, &addr("alice"), &addr("carol"), Decimal::from(50)).unwrap();
    core.freeze_many_addresses(&admin(), token, &[addr("carol")], T + DAY).unwrap();

    // Neither sender nor receiver is frozen, but the spender is.
    let err = core
        .transfer_from(token, &addr("carol"), &addr("alice"), &addr("bob"), Decimal::from(10), T)
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::TransferDenied {
            code: TransferCode::Frozen
        }
    );
}

#[test]
fn test_two_party_freeze_chain_ignores_caller() {
    // Same scenario, but the chain's freeze delegate only inspects
    // sender and receiver.
    let mut identity = MemoryRegistry::new();
    for holder in ["alice", "bob", "carol"] {
        identity.register(holder);
    }
    let mut core = Core::new(admin(), Box::new(identity), Box::new(NoRatesOracle));
    let chain: Vec<(DelegateId, Box<dyn ComplianceDelegate>)> = vec![
        (DelegateId::new(1), Box::new(LockDelegate)),
        (
            DelegateId::new(2),
            Box::new(FreezeDelegate::new(FrozenParties::SENDER_RECEIVER)),
        ),
        (DelegateId::new(3), Box::new(KycDelegate)),
        (DelegateId::new(4), Box::new(SupplyDelegate)),
        (DelegateId::new(5), Box::new(ProofDelegate)),
    ];
    let ids: Vec<DelegateId> = chain.iter().map(|(id, _)| *id).collect();
    for (id, delegate) in chain {
        core.register_delegate(&admin(), id, delegate).unwrap();
    }
    core.define_delegate_chain(&admin(), ChainId::new(1), ids).unwrap();
    let token = core.define_token(&admin(), "Two Party", "TWP", 0).unwrap();
    core.set_token_chain(&admin(), token, ChainId::new(1)).unwrap();

    core.mint(&admin(), token, &[addr("alice")], &[Decimal::from(100)], T - DAY).unwrap();
    core.approve(token, &addr("alice"), &addr("carol"), Decimal::from(50)).unwrap();
    core.freeze_many_addresses(&admin(), token, &[addr("carol")], T + DAY).unwrap();

    core.transfer_from(token, &addr("carol"), &addr("alice"), &addr("bob"), Decimal::from(10), T)
        .unwrap();
    assert_eq!(core.balance_of(token, &addr("bob")), Decimal::from(10));
}

// ═══════════════════════════════════════════════════════════════════
// Supply invariants
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_mint_transfer_scenario() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 1_000_000);
    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(3_333), T).unwrap();

    assert_eq!(core.balance_of(token, &addr("alice")), Decimal::from(996_667));
    assert_eq!(core.balance_of(token, &addr("bob")), Decimal::from(3_333));
    assert_eq!(core.total_supply(token).unwrap(), Decimal::from(1_000_000));
    assert_eq!(core.state().sum_balances(token), Decimal::from(1_000_000));
}

#[test]
fn test_finish_minting_is_terminal() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    mint(&mut core, token, "admin", 50);
    core.finish_minting(&admin(), token).unwrap();
    assert!(core.token_info(token).unwrap().minting_finished);

    let err = core
        .mint(&admin(), token, &[addr("bob")], &[Decimal::ONE], T)
        .unwrap_err();
    assert_eq!(err, CoreError::Supply(SupplyError::MintingFinished));

    let err = core.finish_minting(&admin(), token).unwrap_err();
    assert_eq!(err, CoreError::Supply(SupplyError::MintingFinished));

    // Burning is unaffected by the terminal minting state.
    core.burn(&admin(), token, Decimal::from(50), T).unwrap();
    assert_eq!(core.total_supply(token).unwrap(), Decimal::from(100));
}

#[test]
fn test_mint_array_mismatch_rejected() {
    let (mut core, token) = setup();
    let err = core
        .mint(
            &admin(),
            token,
            &[addr("alice"), addr("bob")],
            &[Decimal::ONE],
            T,
        )
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::Supply(SupplyError::LengthMismatch {
            recipients: 2,
            amounts: 1
        })
    );
}

#[test]
fn test_burn_requires_operator_balance() {
    let (mut core, token) = setup();
    mint(&mut core, token, "admin", 50);
    core.burn(&admin(), token, Decimal::from(20), T).unwrap();
    assert_eq!(core.total_supply(token).unwrap(), Decimal::from(30));

    let err = core.burn(&admin(), token, Decimal::from(31), T).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Supply(SupplyError::InsufficientBalance { .. })
    ));
    assert_eq!(core.state().sum_balances(token), Decimal::from(30));
}

#[test]
fn test_non_operator_configuration_rejected() {
    let (mut core, token) = setup();
    let mallory = addr("mallory");
    assert!(matches!(
        core.mint(&mallory, token, &[addr("alice")], &[Decimal::ONE], T),
        Err(CoreError::NotOperator { .. })
    ));
    assert!(matches!(
        core.define_rules(&mallory, token, vec![]),
        Err(CoreError::NotOperator { .. })
    ));
    assert!(matches!(
        core.define_lock(&mallory, token, AddressScope::Any, AddressScope::Any, 0, 1),
        Err(CoreError::NotOperator { .. })
    ));
    assert!(matches!(
        core.freeze_many_addresses(&mallory, token, &[addr("alice")], T),
        Err(CoreError::NotOperator { .. })
    ));
    assert!(matches!(
        core.finish_minting(&mallory, token),
        Err(CoreError::NotOperator { .. })
    ));
}

proptest! {
    /// sum(balances) == total_supply after any mint/transfer/burn sequence.
    #[test]
    fn prop_supply_invariant(ops in proptest::collection::vec((0u8..3, 1u64..500), 1..40)) {
        let (mut core, token) = setup();
        let holders = ["alice", "bob", "carol"];
        mint(&mut core, token, "admin", 10_000);

        for (i, (op, amount)) in ops.into_iter().enumerate() {
            let from = holders[i % holders.len()];
            let to = holders[(i + 1) % holders.len()];
            let amount = Decimal::from(amount);
            match op {
                0 => {
                    let _ = core.mint(&admin(), token, &[addr(from)], &[amount], T);
                }
                1 => {
                    // May fail on balance or registration; failures must not
                    // disturb the invariant.
                    let _ = core.transfer(token, &addr(from), &addr(to), amount, T);
                }
                _ => {
                    let _ = core.burn(&admin(), token, amount, T);
                }
            }
            prop_assert_eq!(
                core.state().sum_balances(token),
                core.total_supply(token).unwrap()
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Audit ledger
// ═══════════════════════════════════════════════════════════════════

fn bind_audit_scope(core: &mut Core, token: TokenId, currency: Option<&str>) -> AuditScopeId {
    let scope = AuditScopeId::new(1);
    core.define_audit_configuration(
        &admin(),
        scope,
        AuditScopeConfig {
            trigger: TriggerMode::Both,
            storage: StorageMode::PerToken,
            fields: RecordedFields::ALL,
            currency: currency.map(String::from),
        },
    )
    .unwrap();
    core.set_token_audit_scopes(&admin(), token, vec![scope]).unwrap();
    scope
}

fn record_key(scope: AuditScopeId, token: TokenId, holder: &str) -> AuditRecordKey {
    AuditRecordKey {
        scope,
        token: Some(token),
        holder: addr(holder),
    }
}

#[test]
fn test_audit_accumulates_both_sides() {
    let (mut core, token) = setup();
    let scope = bind_audit_scope(&mut core, token, None);
    mint(&mut core, token, "alice", 10_000);

    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(100), T).unwrap();
    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(250), T + 60).unwrap();

    let sender = core.audit_record(&record_key(scope, token, "alice")).unwrap();
    assert_eq!(sender.cumulative_sent, Decimal::from(350));
    assert_eq!(sender.last_transaction_at, T + 60);

    let receiver = core.audit_record(&record_key(scope, token, "bob")).unwrap();
    assert_eq!(receiver.cumulative_received, Decimal::from(350));
}

#[test]
fn test_audit_currency_conversion() {
    let mut oracle = FixedRateOracle::new();
    oracle.set_rate("CHF", Decimal::new(5, 1)); // 0.5
    let (mut core, token) = setup_with_oracle(Box::new(oracle));
    let scope = bind_audit_scope(&mut core, token, Some("CHF"));
    mint(&mut core, token, "alice", 10_000);

    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(100), T).unwrap();

    let sender = core.audit_record(&record_key(scope, token, "alice")).unwrap();
    assert_eq!(sender.cumulative_sent, Decimal::from(100));
    assert_eq!(sender.cumulative_sent_currency, Decimal::from(50));
}

#[test]
fn test_audit_records_mints_as_received() {
    let (mut core, token) = setup();
    let scope = bind_audit_scope(&mut core, token, None);
    core.mint(&admin(), token, &[addr("alice")], &[Decimal::from(77)], T).unwrap();

    let record = core.audit_record(&record_key(scope, token, "alice")).unwrap();
    assert_eq!(record.cumulative_received, Decimal::from(77));
    assert_eq!(record.cumulative_sent, Decimal::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// Ownership proofs
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_proof_windows_contiguous() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 500);

    let p0 = core.create_proof(token, &addr("alice"), T).unwrap();
    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(200), T + 100).unwrap();
    let p1 = core.create_proof(token, &addr("alice"), T + 200).unwrap();

    assert_eq!((p0, p1), (0, 1));
    let proofs = core.proofs(token, &addr("alice"));
    assert_eq!(proofs.len(), 2);
    assert_eq!(proofs[0].end_at, proofs[1].start_at, "Windows must be contiguous");
    assert!(proofs[0].start_at <= proofs[0].end_at);
    assert_eq!(proofs[0].amount, Decimal::from(500));
    assert_eq!(proofs[1].amount, Decimal::from(300));
}

#[test]
fn test_proofs_immutable_after_later_activity() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 500);
    core.create_proof(token, &addr("alice"), T).unwrap();
    let snapshot = core.proofs(token, &addr("alice"))[0].clone();

    core.transfer(token, &addr("alice"), &addr("bob"), Decimal::from(499), T + 50).unwrap();
    assert_eq!(core.proofs(token, &addr("alice"))[0], snapshot);
}

// ═══════════════════════════════════════════════════════════════════
// Atomicity
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_rule_stage_failure_leaves_state_identical() {
    let (mut core, token) = setup();
    bind_audit_scope(&mut core, token, None);
    mint(&mut core, token, "alice", 5_000);
    core.define_lock(
        &admin(),
        token,
        AddressScope::Exact(addr("x")),
        AddressScope::Any,
        T - DAY,
        T + DAY,
    )
    .unwrap();
    core.define_rules(&admin(), token, vec![RuleId::new(1)]).unwrap();

    let before = core.state().clone();
    let err = core
        .transfer(token, &addr("alice"), &addr("bob"), Decimal::from(2_000), T)
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::TransferDenied {
            code: TransferCode::RuleRejected
        }
    );
    // Balances, locks, and audit records are untouched.
    assert_eq!(core.state(), &before);
}

#[test]
fn test_partial_mint_rolls_back_entirely() {
    let (mut core, token) = setup();
    mint(&mut core, token, "alice", 100);
    let before = core.state().clone();

    // Second amount is invalid; the first recipient's credit must not stick.
    let err = core
        .mint(
            &admin(),
            token,
            &[addr("bob"), addr("carol")],
            &[Decimal::from(10), Decimal::ZERO],
            T,
        )
        .unwrap_err();
    assert_eq!(err, CoreError::InvalidAmount);
    assert_eq!(core.state(), &before);
}

#[test]
fn test_budget_exhaustion_is_total_rollback() {
    let (mut core, token) = setup();
    bind_audit_scope(&mut core, token, None);
    mint(&mut core, token, "alice", 100);
    let before = core.state().clone();

    // Enough budget to pass the checks but not the audit update.
    core.set_execution_budget(&admin(), 70).unwrap();
    let err = core
        .transfer(token, &addr("alice"), &addr("bob"), Decimal::from(10), T)
        .unwrap_err();
    assert!(matches!(err, CoreError::BudgetExhausted { .. }));
    assert_eq!(core.state(), &before);
}

// ═══════════════════════════════════════════════════════════════════
// Proxy front-ends
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_proxy_round_trip() {
    let (mut core, token) = setup();
    let proxy = deploy_proxy(&mut core, token).unwrap();

    proxy
        .mint(&mut core, &admin(), &[addr("alice")], &[Decimal::from(1_000)], T)
        .unwrap();
    proxy
        .transfer(&mut core, &addr("alice"), &addr("bob"), Decimal::from(400), T)
        .unwrap();

    let info = proxy.token_info(&core).unwrap();
    assert_eq!(info.symbol, "RGS");
    assert_eq!(info.total_supply, Decimal::from(1_000));
    assert_eq!(proxy.balance_of(&core, &addr("bob")), Decimal::from(400));
    assert_eq!(
        proxy
            .can_transfer(&core, &addr("alice"), &addr("bob"), Decimal::from(1), T)
            .unwrap(),
        TransferCode::Ok
    );
}
