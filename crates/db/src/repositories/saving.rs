//! Saving repository for savings records and their journal postings.
//!
//! The approval path and the bulk import both post their journal entries
//! inside the same transaction that mutates the savings rows, so a failure
//! anywhere rolls everything back.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use arta_core::bulk::{self, BulkError, RawRow, TypeInfo};
use arta_core::posting::{PostingError, PostingService, SavingStatus, SavingTypeKind};
use arta_shared::PageRequest;

use crate::entities::{journal_headers, members, saving_types, savings, sea_orm_active_enums};
use crate::repositories::account::find_account_by_number;
use crate::repositories::journal::insert_posting;

/// Error types for saving operations.
#[derive(Debug, thiserror::Error)]
pub enum SavingError {
    /// Saving not found.
    #[error("Saving not found: {0}")]
    NotFound(Uuid),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Saving type not found.
    #[error("Saving type not found: {0}")]
    TypeNotFound(Uuid),

    /// The saving type has no mapped ledger account.
    #[error("Saving type \"{type_name}\" has no mapped ledger account; map it in settings first")]
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

    /// Bulk reconciliation failed.
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing savings.
#[derive(Debug, Clone, Default)]
pub struct SavingFilter {
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive member name search.
    pub search: Option<String>,
    /// Filter by saving type.
    pub saving_type_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<sea_orm_active_enums::SavingStatus>,
}

/// Input for creating a saving record.
#[derive(Debug, Clone)]
pub struct CreateSavingInput {
    /// Member ID.
    pub member_id: Uuid,
    /// Saving type ID.
    pub saving_type_id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Entry date; today when absent.
    pub date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Input for editing a saving record.
#[derive(Debug, Clone)]
pub struct UpdateSavingInput {
    /// Member ID.
    pub member_id: Uuid,
    /// Saving type ID.
    pub saving_type_id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
}

/// A saving record joined with member and type names.
#[derive(Debug, Clone)]
pub struct SavingWithDetails {
    /// The saving record.
    pub saving: savings::Model,
    /// Member name.
    pub member_name: String,
    /// Member cooperative number.
    pub cooperative_number: String,
    /// Saving type name.
    pub saving_type_name: String,
}

/// Saving repository for savings lifecycle operations.
#[derive(Debug, Clone)]
pub struct SavingRepository {
    db: DatabaseConnection,
}

impl SavingRepository {
    /// Creates a new saving repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists savings with filters, newest first, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: SavingFilter,
        page: &PageRequest,
    ) -> Result<(Vec<SavingWithDetails>, u64), SavingError> {
        let mut query = savings::Entity::find();

        if let Some(from) = filter.date_from {
            query = query.filter(savings::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(savings::Column::Date.lte(to));
        }
        if let Some(type_id) = filter.saving_type_id {
            query = query.filter(savings::Column::SavingTypeId.eq(type_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(savings::Column::Status.eq(status));
        }
        if let Some(search) = &filter.search {
            query = query
                .join(JoinType::InnerJoin, savings::Relation::Members.def())
                .filter(members::Column::Name.contains(search));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_desc(savings::Column::Date)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let details = self.with_details(rows).await?;
        Ok((details, total))
    }

    /// Lists all savings of one member, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<SavingWithDetails>, SavingError> {
        let rows = savings::Entity::find()
            .filter(savings::Column::MemberId.eq(member_id))
            .order_by_desc(savings::Column::Date)
            .all(&self.db)
            .await?;

        self.with_details(rows).await
    }

    /// Creates a pending saving record.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or type does not exist.
    pub async fn create(&self, input: CreateSavingInput) -> Result<savings::Model, SavingError> {
        members::Entity::find_by_id(input.member_id)
            .one(&self.db)
            .await?
            .ok_or(SavingError::MemberNotFound(input.member_id))?;
        saving_types::Entity::find_by_id(input.saving_type_id)
            .one(&self.db)
            .await?
            .ok_or(SavingError::TypeNotFound(input.saving_type_id))?;

        let now = Utc::now();
        let saving = savings::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(input.member_id),
            saving_type_id: Set(input.saving_type_id),
            amount: Set(input.amount),
            date: Set(input.date.unwrap_or_else(|| now.date_naive())),
            status: Set(sea_orm_active_enums::SavingStatus::Pending),
            description: Set(input.description),
            journal_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(saving.insert(&self.db).await?)
    }

    /// Edits a saving record's member, type, amount, and description.
    ///
    /// # Errors
    ///
    /// Returns an error if the saving does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSavingInput,
    ) -> Result<savings::Model, SavingError> {
        let saving = savings::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SavingError::NotFound(id))?;

        let mut active: savings::ActiveModel = saving.into();
        active.member_id = Set(input.member_id);
        active.saving_type_id = Set(input.saving_type_id);
        active.amount = Set(input.amount);
        active.description = Set(input.description);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a saving record together with its linked journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the saving does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), SavingError> {
        let txn = self.db.begin().await?;

        let saving = savings::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(SavingError::NotFound(id))?;
        let journal_id = saving.journal_id;

        savings::Entity::delete_by_id(id).exec(&txn).await?;

        // Lines cascade off the header.
        if let Some(journal_id) = journal_id {
            journal_headers::Entity::delete_by_id(journal_id)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Updates a saving's status, posting a journal entry on the
    /// transition into `Approved`.
    ///
    /// The row is locked for the duration of the transaction so two
    /// concurrent approvals cannot double-post; re-approving an already
    /// approved record only rewrites the status column.
    ///
    /// # Errors
    ///
    /// Returns an error when the saving does not exist, its type has no
    /// mapped account, or the designated cash account is missing. Any
    /// error rolls back the status update as well.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: SavingStatus,
        cash_account_number: &str,
    ) -> Result<savings::Model, SavingError> {
        let txn = self.db.begin().await?;

        let saving = savings::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(SavingError::NotFound(id))?;
        let current = saving_status_to_core(&saving.status);

        let mut active: savings::ActiveModel = saving.clone().into();
        active.status = Set(saving_status_from_core(new_status));
        active.updated_at = Set(Utc::now().into());

        if PostingService::should_post(current, new_status) {
            let saving_type = saving_types::Entity::find_by_id(saving.saving_type_id)
                .one(&txn)
                .await?
                .ok_or(SavingError::TypeNotFound(saving.saving_type_id))?;
            let member = members::Entity::find_by_id(saving.member_id)
                .one(&txn)
                .await?
                .ok_or(SavingError::MemberNotFound(saving.member_id))?;

            let mapped_account =
                saving_type
                    .account_id
                    .ok_or_else(|| SavingError::UnmappedAccount {
                        type_name: saving_type.name.clone(),
                    })?;
            let cash = find_account_by_number(&txn, cash_account_number)
                .await?
                .ok_or_else(|| SavingError::MissingCashAccount {
                    account_number: cash_account_number.to_string(),
                })?;

            let plan = PostingService::plan_saving(
                kind_to_core(&saving_type.kind),
                &saving_type.name,
                &member.name,
                saving.amount,
                mapped_account,
                cash.id,
            )?;

            let journal_id =
                insert_posting(&txn, Utc::now().into(), &plan.description, &[plan.pair]).await?;
            active.journal_id = Set(Some(journal_id));
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Imports a batch of raw upload rows as pre-approved savings with one
    /// consolidated journal header.
    ///
    /// Reconciliation happens entirely before the first write; the batch
    /// commits or rolls back as a whole. Returns the number of imported
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns a `Bulk` error naming the first unresolvable row/entity, or
    /// `MissingCashAccount` when the designated cash account is absent.
    pub async fn bulk_import(
        &self,
        rows: &[RawRow],
        cash_account_number: &str,
    ) -> Result<usize, SavingError> {
        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;

        // Lookup maps for the explicit reconciliation pass.
        let numbers: HashSet<&str> = rows
            .iter()
            .map(|r| r.cooperative_number.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        let names: HashSet<&str> = rows
            .iter()
            .map(|r| r.saving_type.as_str())
            .filter(|n| !n.is_empty())
            .collect();

        let member_map: HashMap<String, Uuid> = members::Entity::find()
            .filter(members::Column::CooperativeNumber.is_in(numbers))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| (m.cooperative_number, m.id))
            .collect();

        let type_map: HashMap<String, TypeInfo> = saving_types::Entity::find()
            .filter(saving_types::Column::Name.is_in(names))
            .all(&txn)
            .await?
            .into_iter()
            .map(|t| {
                (
                    t.name.clone(),
                    TypeInfo {
                        id: t.id,
                        account_id: t.account_id,
                        kind: kind_to_core(&t.kind),
                    },
                )
            })
            .collect();

        let resolved = bulk::reconcile(rows, &member_map, &type_map, today)?;

        let cash = find_account_by_number(&txn, cash_account_number)
            .await?
            .ok_or_else(|| SavingError::MissingCashAccount {
                account_number: cash_account_number.to_string(),
            })?;

        let now = Utc::now();
        let saving_models: Vec<savings::ActiveModel> = resolved
            .iter()
            .map(|row| savings::ActiveModel {
                id: Set(Uuid::new_v4()),
                member_id: Set(row.member_id),
                saving_type_id: Set(row.saving_type_id),
                amount: Set(row.amount),
                date: Set(row.date),
                status: Set(sea_orm_active_enums::SavingStatus::Approved),
                description: Set(row.description.clone()),
                journal_id: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            })
            .collect();
        savings::Entity::insert_many(saving_models).exec(&txn).await?;

        let pairs = resolved
            .iter()
            .map(|row| PostingService::saving_pair(row.kind, row.amount, row.account_id, cash.id))
            .collect::<Result<Vec<_>, _>>()?;

        let description = format!("Bulk savings import dated {today}");
        insert_posting(&txn, now.into(), &description, &pairs).await?;

        txn.commit().await?;
        Ok(resolved.len())
    }

    async fn with_details(
        &self,
        rows: Vec<savings::Model>,
    ) -> Result<Vec<SavingWithDetails>, SavingError> {
        let member_ids: HashSet<Uuid> = rows.iter().map(|s| s.member_id).collect();
        let type_ids: HashSet<Uuid> = rows.iter().map(|s| s.saving_type_id).collect();

        let member_map: HashMap<Uuid, members::Model> = members::Entity::find()
            .filter(members::Column::Id.is_in(member_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let type_map: HashMap<Uuid, saving_types::Model> = saving_types::Entity::find()
            .filter(saving_types::Column::Id.is_in(type_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(rows
            .into_iter()
            .map(|saving| {
                let member = member_map.get(&saving.member_id);
                let saving_type = type_map.get(&saving.saving_type_id);
                SavingWithDetails {
                    member_name: member.map(|m| m.name.clone()).unwrap_or_default(),
                    cooperative_number: member
                        .map(|m| m.cooperative_number.clone())
                        .unwrap_or_default(),
                    saving_type_name: saving_type.map(|t| t.name.clone()).unwrap_or_default(),
                    saving,
                }
            })
            .collect())
    }
}

pub(crate) fn saving_status_to_core(status: &sea_orm_active_enums::SavingStatus) -> SavingStatus {
    match status {
        sea_orm_active_enums::SavingStatus::Pending => SavingStatus::Pending,
        sea_orm_active_enums::SavingStatus::Approved => SavingStatus::Approved,
        sea_orm_active_enums::SavingStatus::Rejected => SavingStatus::Rejected,
    }
}

pub(crate) fn saving_status_from_core(status: SavingStatus) -> sea_orm_active_enums::SavingStatus {
    match status {
        SavingStatus::Pending => sea_orm_active_enums::SavingStatus::Pending,
        SavingStatus::Approved => sea_orm_active_enums::SavingStatus::Approved,
        SavingStatus::Rejected => sea_orm_active_enums::SavingStatus::Rejected,
    }
}

pub(crate) fn kind_to_core(kind: &sea_orm_active_enums::SavingTypeKind) -> SavingTypeKind {
    match kind {
        sea_orm_active_enums::SavingTypeKind::Deposit => SavingTypeKind::Deposit,
        sea_orm_active_enums::SavingTypeKind::Withdrawal => SavingTypeKind::Withdrawal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in [
            SavingStatus::Pending,
            SavingStatus::Approved,
            SavingStatus::Rejected,
        ] {
            assert_eq!(
                saving_status_to_core(&saving_status_from_core(status)),
                status
            );
        }
    }
}
