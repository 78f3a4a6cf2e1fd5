//! Loan repository for the loan lifecycle and its journal postings.
//!
//! Final approval generates the installment schedule and posts the
//! disbursement; each installment payment is its own postable event that
//! may flip the loan into its terminal paid-off state.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use arta_core::posting::{LoanStatus, PostingError, PostingService};
use arta_core::schedule::{self, ScheduleError};
use arta_shared::PageRequest;

use crate::entities::{loan_installments, loan_types, loans, members, sea_orm_active_enums};
use crate::repositories::account::find_account_by_number;
use crate::repositories::journal::insert_posting;

/// Error types for loan operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    NotFound(Uuid),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Loan type not found.
    #[error("Loan type not found: {0}")]
    TypeNotFound(Uuid),

    /// Installment not found or already paid.
    #[error("Installment {number} of loan {loan_id} not found or already paid")]
    InstallmentNotFound {
        /// The loan.
        loan_id: Uuid,
        /// The requested installment number.
        number: u32,
    },

    /// Illegal status transition.
    #[error("Cannot move loan from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// The loan type has no mapped ledger account.
    #[error("Loan type \"{type_name}\" has no mapped ledger account; map it in settings first")]
    UnmappedAccount {
        /// Name of the unmapped type.
        type_name: String,
    },

    /// The designated cash account does not exist.
    #[error("Cash account '{account_number}' not found in the chart of accounts")]
    MissingCashAccount {
        /// The configured cash account number.
        account_number: String,
    },

    /// Posting plan rejected the entry.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Installment schedule could not be built.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a loan application.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// Member ID.
    pub member_id: Uuid,
    /// Loan type ID.
    pub loan_type_id: Uuid,
    /// Principal amount.
    pub amount: Decimal,
    /// Tenor in months.
    pub tenor_months: u32,
    /// Stated purpose.
    pub purpose: Option<String>,
}

/// A loan joined with member and type names.
#[derive(Debug, Clone)]
pub struct LoanWithDetails {
    /// The loan record.
    pub loan: loans::Model,
    /// Member name.
    pub member_name: String,
    /// Member cooperative number.
    pub cooperative_number: String,
    /// Loan type name.
    pub loan_type_name: String,
}

/// A loan with its full installment schedule.
#[derive(Debug, Clone)]
pub struct LoanDetails {
    /// The loan with joined names.
    pub loan: LoanWithDetails,
    /// Installments ordered by number.
    pub installments: Vec<loan_installments::Model>,
}

/// Outcome of recording an installment payment.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The paid installment.
    pub installment: loan_installments::Model,
    /// The loan status after re-evaluation.
    pub loan_status: LoanStatus,
}

/// Loan repository for loan lifecycle operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a pending loan application.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or loan type does not exist.
    pub async fn create(&self, input: CreateLoanInput) -> Result<loans::Model, LoanError> {
        members::Entity::find_by_id(input.member_id)
            .one(&self.db)
            .await?
            .ok_or(LoanError::MemberNotFound(input.member_id))?;
        loan_types::Entity::find_by_id(input.loan_type_id)
            .one(&self.db)
            .await?
            .ok_or(LoanError::TypeNotFound(input.loan_type_id))?;

        let now = Utc::now().into();
        let loan = loans::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(input.member_id),
            loan_type_id: Set(input.loan_type_id),
            amount: Set(input.amount),
            tenor_months: Set(i32::try_from(input.tenor_months).unwrap_or(i32::MAX)),
            purpose: Set(input.purpose),
            status: Set(sea_orm_active_enums::LoanStatus::Pending),
            journal_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(loan.insert(&self.db).await?)
    }

    /// Lists loans with optional status filter, newest first, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        status: Option<sea_orm_active_enums::LoanStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<LoanWithDetails>, u64), LoanError> {
        let mut query = loans::Entity::find();
        if let Some(status) = status {
            query = query.filter(loans::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(loans::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let details = self.with_details(rows).await?;
        Ok((details, total))
    }

    /// Lists all loans of one member, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_member(&self, member_id: Uuid) -> Result<Vec<loans::Model>, LoanError> {
        let rows = loans::Entity::find()
            .filter(loans::Column::MemberId.eq(member_id))
            .order_by_desc(loans::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Gets a loan with its installment schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan does not exist.
    pub async fn get_details(&self, id: Uuid) -> Result<LoanDetails, LoanError> {
        let loan = loans::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LoanError::NotFound(id))?;

        let installments = loan_installments::Entity::find()
            .filter(loan_installments::Column::LoanId.eq(id))
            .order_by_asc(loan_installments::Column::InstallmentNumber)
            .all(&self.db)
            .await?;

        let mut with_details = self.with_details(vec![loan]).await?;
        let loan = with_details.remove(0);

        Ok(LoanDetails { loan, installments })
    }

    /// Moves a loan through its review stages.
    ///
    /// The transition into `Approved` is the disbursement event: it
    /// requires the loan type's mapped account and the designated cash
    /// account, generates the installment schedule, and posts the journal
    /// entry. Everything happens in one transaction with the loan row
    /// locked, so a retried approval cannot disburse twice.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown loans, illegal transitions, unmapped
    /// accounts, or a missing cash account; all writes roll back together.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: LoanStatus,
        cash_account_number: &str,
    ) -> Result<loans::Model, LoanError> {
        let txn = self.db.begin().await?;

        let loan = loans::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LoanError::NotFound(id))?;
        let current = loan_status_to_core(&loan.status);

        if !current.can_transition(new_status) {
            return Err(LoanError::InvalidTransition {
                from: current.as_str(),
                to: new_status.as_str(),
            });
        }

        let mut active: loans::ActiveModel = loan.clone().into();
        active.status = Set(loan_status_from_core(new_status));
        active.updated_at = Set(Utc::now().into());

        if new_status == LoanStatus::Approved {
            let loan_type = loan_types::Entity::find_by_id(loan.loan_type_id)
                .one(&txn)
                .await?
                .ok_or(LoanError::TypeNotFound(loan.loan_type_id))?;
            let member = members::Entity::find_by_id(loan.member_id)
                .one(&txn)
                .await?
                .ok_or(LoanError::MemberNotFound(loan.member_id))?;

            let receivable = loan_type
                .account_id
                .ok_or_else(|| LoanError::UnmappedAccount {
                    type_name: loan_type.name.clone(),
                })?;
            let cash = find_account_by_number(&txn, cash_account_number)
                .await?
                .ok_or_else(|| LoanError::MissingCashAccount {
                    account_number: cash_account_number.to_string(),
                })?;

            let plan = PostingService::plan_loan_disbursement(
                &loan_type.name,
                &member.name,
                loan.amount,
                receivable,
                cash.id,
            )?;
            let journal_id =
                insert_posting(&txn, Utc::now().into(), &plan.description, &[plan.pair]).await?;
            active.journal_id = Set(Some(journal_id));

            let today = Utc::now().date_naive();
            let plans = schedule::build_schedule(
                loan.amount,
                loan.tenor_months.unsigned_abs(),
                loan_type.monthly_interest_rate,
                today,
            )?;

            let now = Utc::now().into();
            let installments: Vec<loan_installments::ActiveModel> = plans
                .into_iter()
                .map(|p| loan_installments::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    loan_id: Set(loan.id),
                    installment_number: Set(i32::try_from(p.number).unwrap_or(i32::MAX)),
                    due_date: Set(p.due_date),
                    principal: Set(p.principal),
                    interest: Set(p.interest),
                    total: Set(p.total),
                    paid_at: Set(None),
                    created_at: Set(now),
                })
                .collect();
            loan_installments::Entity::insert_many(installments)
                .exec(&txn)
                .await?;
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Records one installment payment and re-evaluates the loan.
    ///
    /// The installment is marked paid with today's date, its cash
    /// movement is posted, and when no unpaid installments remain the
    /// loan transitions to `PaidOff`.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentNotFound` for unknown or already-paid
    /// installments; posting preconditions abort the whole payment.
    pub async fn record_installment_payment(
        &self,
        loan_id: Uuid,
        installment_number: u32,
        cash_account_number: &str,
    ) -> Result<PaymentOutcome, LoanError> {
        let txn = self.db.begin().await?;

        let loan = loans::Entity::find_by_id(loan_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LoanError::NotFound(loan_id))?;

        let installment = loan_installments::Entity::find()
            .filter(loan_installments::Column::LoanId.eq(loan_id))
            .filter(
                loan_installments::Column::InstallmentNumber
                    .eq(i32::try_from(installment_number).unwrap_or(i32::MAX)),
            )
            .one(&txn)
            .await?
            .ok_or(LoanError::InstallmentNotFound {
                loan_id,
                number: installment_number,
            })?;
        if installment.paid_at.is_some() {
            return Err(LoanError::InstallmentNotFound {
                loan_id,
                number: installment_number,
            });
        }

        let loan_type = loan_types::Entity::find_by_id(loan.loan_type_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::TypeNotFound(loan.loan_type_id))?;
        let member = members::Entity::find_by_id(loan.member_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::MemberNotFound(loan.member_id))?;

        let receivable = loan_type
            .account_id
            .ok_or_else(|| LoanError::UnmappedAccount {
                type_name: loan_type.name.clone(),
            })?;
        let cash = find_account_by_number(&txn, cash_account_number)
            .await?
            .ok_or_else(|| LoanError::MissingCashAccount {
                account_number: cash_account_number.to_string(),
            })?;

        let today = Utc::now().date_naive();
        let mut paid: loan_installments::ActiveModel = installment.into();
        paid.paid_at = Set(Some(today));
        let installment = paid.update(&txn).await?;

        let plan = PostingService::plan_installment_payment(
            &member.name,
            installment_number,
            installment.total,
            receivable,
            cash.id,
        )?;
        insert_posting(&txn, Utc::now().into(), &plan.description, &[plan.pair]).await?;

        let unpaid = loan_installments::Entity::find()
            .filter(loan_installments::Column::LoanId.eq(loan_id))
            .filter(loan_installments::Column::PaidAt.is_null())
            .count(&txn)
            .await?;

        let loan_status = if unpaid == 0 {
            let mut active: loans::ActiveModel = loan.into();
            active.status = Set(sea_orm_active_enums::LoanStatus::PaidOff);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
            LoanStatus::PaidOff
        } else {
            loan_status_to_core(&loan.status)
        };

        txn.commit().await?;

        Ok(PaymentOutcome {
            installment,
            loan_status,
        })
    }

    async fn with_details(
        &self,
        rows: Vec<loans::Model>,
    ) -> Result<Vec<LoanWithDetails>, LoanError> {
        let member_ids: HashSet<Uuid> = rows.iter().map(|l| l.member_id).collect();
        let type_ids: HashSet<Uuid> = rows.iter().map(|l| l.loan_type_id).collect();

        let member_map: HashMap<Uuid, members::Model> = members::Entity::find()
            .filter(members::Column::Id.is_in(member_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let type_map: HashMap<Uuid, loan_types::Model> = loan_types::Entity::find()
            .filter(loan_types::Column::Id.is_in(type_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(rows
            .into_iter()
            .map(|loan| {
                let member = member_map.get(&loan.member_id);
                let loan_type = type_map.get(&loan.loan_type_id);
                LoanWithDetails {
                    member_name: member.map(|m| m.name.clone()).unwrap_or_default(),
                    cooperative_number: member
                        .map(|m| m.cooperative_number.clone())
                        .unwrap_or_default(),
                    loan_type_name: loan_type.map(|t| t.name.clone()).unwrap_or_default(),
                    loan,
                }
            })
            .collect())
    }
}

pub(crate) fn loan_status_to_core(status: &sea_orm_active_enums::LoanStatus) -> LoanStatus {
    match status {
        sea_orm_active_enums::LoanStatus::Pending => LoanStatus::Pending,
        sea_orm_active_enums::LoanStatus::AccountingApproved => LoanStatus::AccountingApproved,
        sea_orm_active_enums::LoanStatus::Approved => LoanStatus::Approved,
        sea_orm_active_enums::LoanStatus::PaidOff => LoanStatus::PaidOff,
        sea_orm_active_enums::LoanStatus::Rejected => LoanStatus::Rejected,
    }
}

pub(crate) fn loan_status_from_core(status: LoanStatus) -> sea_orm_active_enums::LoanStatus {
    match status {
        LoanStatus::Pending => sea_orm_active_enums::LoanStatus::Pending,
        LoanStatus::AccountingApproved => sea_orm_active_enums::LoanStatus::AccountingApproved,
        LoanStatus::Approved => sea_orm_active_enums::LoanStatus::Approved,
        LoanStatus::PaidOff => sea_orm_active_enums::LoanStatus::PaidOff,
        LoanStatus::Rejected => sea_orm_active_enums::LoanStatus::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in [
            LoanStatus::Pending,
            LoanStatus::AccountingApproved,
            LoanStatus::Approved,
            LoanStatus::PaidOff,
            LoanStatus::Rejected,
        ] {
            assert_eq!(loan_status_to_core(&loan_status_from_core(status)), status);
        }
    }
}
