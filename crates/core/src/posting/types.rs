//! Domain types for journal posting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a savings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SavingStatus {
    /// Awaiting review.
    Pending,
    /// Approved and posted to the ledger.
    Approved,
    /// Rejected, never posted.
    Rejected,
}

impl SavingStatus {
    /// Parse a status from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Lifecycle status of a loan.
///
/// Loans pass two review stages: accounting first, then the manager.
/// `PaidOff` is reached only through installment payments, never through
/// the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// Awaiting accounting review.
    Pending,
    /// Approved by accounting, awaiting manager approval.
    AccountingApproved,
    /// Fully approved and disbursed.
    Approved,
    /// Every installment has been paid.
    PaidOff,
    /// Rejected at either review stage.
    Rejected,
}

impl LoanStatus {
    /// Parse a status from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "AccountingApproved" => Some(Self::AccountingApproved),
            "Approved" => Some(Self::Approved),
            "PaidOff" => Some(Self::PaidOff),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AccountingApproved => "AccountingApproved",
            Self::Approved => "Approved",
            Self::PaidOff => "PaidOff",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether the status endpoint may move a loan from `self` to `to`.
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        match self {
            Self::Pending => matches!(to, Self::AccountingApproved | Self::Rejected),
            Self::AccountingApproved => matches!(to, Self::Approved | Self::Rejected),
            // Terminal for the status endpoint; PaidOff is reached via payments.
            Self::Approved | Self::PaidOff | Self::Rejected => false,
        }
    }
}

/// Direction discriminant of a saving type.
///
/// Deposits move cash in (debit cash), withdrawals move cash out
/// (credit cash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingTypeKind {
    /// Member pays cash into the cooperative.
    Deposit,
    /// Member takes cash out of the cooperative.
    Withdrawal,
}

impl SavingTypeKind {
    /// Parse a kind from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            _ => None,
        }
    }

    /// Returns the wire representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

/// A matched debit/credit pair over two accounts with one amount.
///
/// Constructing entries through this type is what keeps every journal
/// balanced: both lines always carry the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePair {
    /// Account debited by `amount`.
    pub debit_account: Uuid,
    /// Account credited by `amount`.
    pub credit_account: Uuid,
    /// The amount moved.
    pub amount: Decimal,
}

impl LinePair {
    /// Expands the pair into `(account_id, debit, credit)` line tuples.
    #[must_use]
    pub fn lines(&self) -> [(Uuid, Decimal, Decimal); 2] {
        [
            (self.debit_account, self.amount, Decimal::ZERO),
            (self.credit_account, Decimal::ZERO, self.amount),
        ]
    }
}

/// A fully planned journal posting: header description plus its line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    /// Human-readable journal description.
    pub description: String,
    /// The balanced debit/credit pair.
    pub pair: LinePair,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LoanStatus::Pending, LoanStatus::AccountingApproved, true)]
    #[case(LoanStatus::Pending, LoanStatus::Rejected, true)]
    #[case(LoanStatus::Pending, LoanStatus::Approved, false)]
    #[case(LoanStatus::AccountingApproved, LoanStatus::Approved, true)]
    #[case(LoanStatus::AccountingApproved, LoanStatus::Rejected, true)]
    #[case(LoanStatus::AccountingApproved, LoanStatus::Pending, false)]
    #[case(LoanStatus::Approved, LoanStatus::PaidOff, false)]
    #[case(LoanStatus::PaidOff, LoanStatus::Approved, false)]
    #[case(LoanStatus::Rejected, LoanStatus::Pending, false)]
    fn test_loan_transitions(
        #[case] from: LoanStatus,
        #[case] to: LoanStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition(to), allowed);
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["Pending", "Approved", "Rejected"] {
            assert_eq!(SavingStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(SavingStatus::parse("Posted").is_none());
    }

    #[test]
    fn test_line_pair_expansion() {
        let debit = Uuid::new_v4();
        let credit = Uuid::new_v4();
        let pair = LinePair {
            debit_account: debit,
            credit_account: credit,
            amount: Decimal::new(100_000, 0),
        };

        let [d, c] = pair.lines();
        assert_eq!(d, (debit, Decimal::new(100_000, 0), Decimal::ZERO));
        assert_eq!(c, (credit, Decimal::ZERO, Decimal::new(100_000, 0)));
    }
}
