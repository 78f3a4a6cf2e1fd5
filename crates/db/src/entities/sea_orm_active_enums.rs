//! Database enum types shared across entities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity account.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue account.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Lifecycle status of a savings record.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "saving_status")]
#[serde(rename_all = "lowercase")]
pub enum SavingStatus {
    /// Awaiting review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved and posted.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected without posting.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Posting direction of a saving type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "saving_type_kind")]
#[serde(rename_all = "lowercase")]
pub enum SavingTypeKind {
    /// Cash moves into the cooperative.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Cash moves out of the cooperative.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

/// Lifecycle status of a loan.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Awaiting accounting review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved by accounting, awaiting manager approval.
    #[sea_orm(string_value = "accounting_approved")]
    AccountingApproved,
    /// Fully approved and disbursed.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Every installment has been paid.
    #[sea_orm(string_value = "paid_off")]
    PaidOff,
    /// Rejected at either review stage.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Membership status of a cooperative member.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_status")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Registered, awaiting admission.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Admitted, in good standing.
    #[sea_orm(string_value = "active")]
    Active,
    /// Registration declined.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Left the cooperative.
    #[sea_orm(string_value = "resigned")]
    Resigned,
}
