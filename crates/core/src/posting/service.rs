//! Posting service: derives balanced journal entries from domain events.
//!
//! This service contains pure business logic with no database dependencies.
//! Account resolution (mapped accounts, the designated cash account) happens
//! in the storage layer; the service receives already-resolved account ids
//! and produces the entry plan.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PostingError;
use super::types::{LinePair, PostingPlan, SavingStatus, SavingTypeKind};

/// Posting service for status-transition bookkeeping.
pub struct PostingService;

impl PostingService {
    /// Whether a savings status change requires a journal posting.
    ///
    /// Posting happens only on the transition into `Approved` from a
    /// different prior status, which makes a retried approval a no-op
    /// with respect to journal creation.
    #[must_use]
    pub fn should_post(current: SavingStatus, new: SavingStatus) -> bool {
        new == SavingStatus::Approved && current != SavingStatus::Approved
    }

    /// Plans the journal entry for an approved savings record.
    ///
    /// Deposits debit cash and credit the saving type's mapped account;
    /// withdrawals reverse the pair.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts or when both sides would
    /// hit the same account.
    pub fn plan_saving(
        kind: SavingTypeKind,
        type_name: &str,
        member_name: &str,
        amount: Decimal,
        mapped_account: Uuid,
        cash_account: Uuid,
    ) -> Result<PostingPlan, PostingError> {
        let description = match kind {
            SavingTypeKind::Deposit => format!("{type_name} deposit for {member_name}"),
            SavingTypeKind::Withdrawal => format!("{type_name} withdrawal for {member_name}"),
        };

        Ok(PostingPlan {
            description,
            pair: Self::saving_pair(kind, amount, mapped_account, cash_account)?,
        })
    }

    /// Builds the balanced pair for a savings posting without a header
    /// description. The bulk import path uses this directly, one pair per
    /// row under a single consolidated header.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts or identical accounts.
    pub fn saving_pair(
        kind: SavingTypeKind,
        amount: Decimal,
        mapped_account: Uuid,
        cash_account: Uuid,
    ) -> Result<LinePair, PostingError> {
        let (debit_account, credit_account) = match kind {
            SavingTypeKind::Deposit => (cash_account, mapped_account),
            SavingTypeKind::Withdrawal => (mapped_account, cash_account),
        };
        Self::pair(debit_account, credit_account, amount)
    }

    /// Plans the disbursement entry for a fully approved loan.
    ///
    /// The receivable account is debited for the principal, cash is
    /// credited: money leaves the cooperative.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts or identical accounts.
    pub fn plan_loan_disbursement(
        type_name: &str,
        member_name: &str,
        amount: Decimal,
        receivable_account: Uuid,
        cash_account: Uuid,
    ) -> Result<PostingPlan, PostingError> {
        Ok(PostingPlan {
            description: format!("{type_name} disbursement for {member_name}"),
            pair: Self::pair(receivable_account, cash_account, amount)?,
        })
    }

    /// Plans the entry for a single installment payment.
    ///
    /// Cash comes in, the receivable shrinks: debit cash, credit the
    /// loan's mapped account.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts or identical accounts.
    pub fn plan_installment_payment(
        member_name: &str,
        installment_number: u32,
        amount: Decimal,
        receivable_account: Uuid,
        cash_account: Uuid,
    ) -> Result<PostingPlan, PostingError> {
        Ok(PostingPlan {
            description: format!("Installment {installment_number} payment from {member_name}"),
            pair: Self::pair(cash_account, receivable_account, amount)?,
        })
    }

    /// Plans the entry for a marketplace cash sale.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive amounts or identical accounts.
    pub fn plan_cash_sale(
        product_name: &str,
        quantity: u32,
        total: Decimal,
        sales_account: Uuid,
        cash_account: Uuid,
    ) -> Result<PostingPlan, PostingError> {
        Ok(PostingPlan {
            description: format!("Cash sale of {quantity} x {product_name}"),
            pair: Self::pair(cash_account, sales_account, total)?,
        })
    }

    fn pair(
        debit_account: Uuid,
        credit_account: Uuid,
        amount: Decimal,
    ) -> Result<LinePair, PostingError> {
        if amount <= Decimal::ZERO {
            return Err(PostingError::NonPositiveAmount);
        }
        if debit_account == credit_account {
            return Err(PostingError::SameAccount);
        }
        Ok(LinePair {
            debit_account,
            credit_account,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_should_post_only_on_fresh_approval() {
        assert!(PostingService::should_post(
            SavingStatus::Pending,
            SavingStatus::Approved
        ));
        assert!(PostingService::should_post(
            SavingStatus::Rejected,
            SavingStatus::Approved
        ));
        // Re-approving never double-posts.
        assert!(!PostingService::should_post(
            SavingStatus::Approved,
            SavingStatus::Approved
        ));
        assert!(!PostingService::should_post(
            SavingStatus::Pending,
            SavingStatus::Rejected
        ));
        assert!(!PostingService::should_post(
            SavingStatus::Approved,
            SavingStatus::Pending
        ));
    }

    #[test]
    fn test_deposit_debits_cash() {
        let mapped = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let plan = PostingService::plan_saving(
            SavingTypeKind::Deposit,
            "Mandatory Saving",
            "Budi Santoso",
            dec!(100000),
            mapped,
            cash,
        )
        .unwrap();

        assert_eq!(plan.pair.debit_account, cash);
        assert_eq!(plan.pair.credit_account, mapped);
        assert_eq!(plan.pair.amount, dec!(100000));
        assert_eq!(plan.description, "Mandatory Saving deposit for Budi Santoso");
    }

    #[test]
    fn test_withdrawal_reverses_pair() {
        let mapped = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let plan = PostingService::plan_saving(
            SavingTypeKind::Withdrawal,
            "Voluntary Saving Withdrawal",
            "Siti Aminah",
            dec!(50000),
            mapped,
            cash,
        )
        .unwrap();

        assert_eq!(plan.pair.debit_account, mapped);
        assert_eq!(plan.pair.credit_account, cash);
    }

    #[test]
    fn test_disbursement_credits_cash() {
        let receivable = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let plan = PostingService::plan_loan_disbursement(
            "Productive Loan",
            "Budi Santoso",
            dec!(2000000),
            receivable,
            cash,
        )
        .unwrap();

        assert_eq!(plan.pair.debit_account, receivable);
        assert_eq!(plan.pair.credit_account, cash);
    }

    #[test]
    fn test_installment_payment_debits_cash() {
        let receivable = Uuid::new_v4();
        let cash = Uuid::new_v4();

        let plan = PostingService::plan_installment_payment(
            "Budi Santoso",
            3,
            dec!(175000),
            receivable,
            cash,
        )
        .unwrap();

        assert_eq!(plan.pair.debit_account, cash);
        assert_eq!(plan.pair.credit_account, receivable);
        assert_eq!(
            plan.description,
            "Installment 3 payment from Budi Santoso"
        );
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let result = PostingService::plan_saving(
            SavingTypeKind::Deposit,
            "Mandatory Saving",
            "Budi",
            dec!(0),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        assert_eq!(result.unwrap_err(), PostingError::NonPositiveAmount);

        let result = PostingService::plan_cash_sale(
            "Rice 5kg",
            1,
            dec!(-10),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        assert_eq!(result.unwrap_err(), PostingError::NonPositiveAmount);
    }

    #[test]
    fn test_rejects_same_account() {
        let account = Uuid::new_v4();
        let result = PostingService::plan_saving(
            SavingTypeKind::Deposit,
            "Mandatory Saving",
            "Budi",
            dec!(1000),
            account,
            account,
        );
        assert_eq!(result.unwrap_err(), PostingError::SameAccount);
    }
}
