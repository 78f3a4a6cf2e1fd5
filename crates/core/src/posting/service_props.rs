//! Property tests for posting plan construction.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::PostingService;
use super::types::SavingTypeKind;

/// Strategy for generating positive decimal amounts
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn kind_strategy() -> impl Strategy<Value = SavingTypeKind> {
    prop_oneof![
        Just(SavingTypeKind::Deposit),
        Just(SavingTypeKind::Withdrawal),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any positive amount, the expanded line pair is balanced:
    /// total debit equals total credit equals the amount.
    #[test]
    fn prop_line_pair_balanced(amount in amount_strategy(), kind in kind_strategy()) {
        let mapped = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let plan = PostingService::plan_saving(kind, "Type", "Member", amount, mapped, cash)
            .expect("positive amount must plan");

        let lines = plan.pair.lines();
        let debit_total: Decimal = lines.iter().map(|(_, d, _)| *d).sum();
        let credit_total: Decimal = lines.iter().map(|(_, _, c)| *c).sum();

        prop_assert_eq!(debit_total, credit_total);
        prop_assert_eq!(debit_total, amount);
    }

    /// Each line carries exactly one non-zero side.
    #[test]
    fn prop_lines_single_sided(amount in amount_strategy(), kind in kind_strategy()) {
        let plan = PostingService::plan_saving(
            kind, "Type", "Member", amount, Uuid::new_v4(), Uuid::new_v4(),
        ).expect("positive amount must plan");

        for (_, debit, credit) in plan.pair.lines() {
            prop_assert!(
                (debit.is_zero()) != (credit.is_zero()),
                "exactly one of debit/credit must be non-zero"
            );
        }
    }

    /// Deposits and withdrawals over the same accounts produce mirrored pairs.
    #[test]
    fn prop_withdrawal_mirrors_deposit(amount in amount_strategy()) {
        let mapped = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let deposit = PostingService::plan_saving(
            SavingTypeKind::Deposit, "Type", "Member", amount, mapped, cash,
        ).unwrap();
        let withdrawal = PostingService::plan_saving(
            SavingTypeKind::Withdrawal, "Type", "Member", amount, mapped, cash,
        ).unwrap();

        prop_assert_eq!(deposit.pair.debit_account, withdrawal.pair.credit_account);
        prop_assert_eq!(deposit.pair.credit_account, withdrawal.pair.debit_account);
    }
}
