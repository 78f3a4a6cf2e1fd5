//! Journal repository for journal header and line database operations.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use arta_core::posting::LinePair;
use arta_shared::PageRequest;

use crate::entities::{chart_of_accounts, journal_headers, journal_lines};

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Journal not found.
    #[error("Journal not found: {0}")]
    NotFound(Uuid),

    /// Journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines")]
    InsufficientLines,

    /// Journal is not balanced (debits != credits).
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line must carry exactly one positive side.
    #[error("Each line must have exactly one of debit or credit set to a positive amount")]
    InvalidLine,

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account cannot take journal lines (inactive or a parent account).
    #[error("Account {0} cannot be posted to")]
    NotPostable(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a single journal line.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Input for creating a manual journal.
#[derive(Debug, Clone)]
pub struct CreateJournalInput {
    /// Entry date.
    pub entry_date: chrono::DateTime<chrono::FixedOffset>,
    /// Description.
    pub description: String,
    /// Journal lines.
    pub lines: Vec<JournalLineInput>,
}

/// Journal header with its lines.
#[derive(Debug, Clone)]
pub struct JournalWithLines {
    /// Journal header.
    pub header: journal_headers::Model,
    /// Journal lines.
    pub lines: Vec<journal_lines::Model>,
}

/// Journal repository for journal storage operations.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists journals with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<JournalWithLines>, u64), JournalError> {
        let total = journal_headers::Entity::find().count(&self.db).await?;

        let headers = journal_headers::Entity::find()
            .order_by_desc(journal_headers::Column::EntryDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let header_ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut lines_by_journal: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
        if !header_ids.is_empty() {
            let lines = journal_lines::Entity::find()
                .filter(journal_lines::Column::JournalId.is_in(header_ids))
                .all(&self.db)
                .await?;
            for line in lines {
                lines_by_journal.entry(line.journal_id).or_default().push(line);
            }
        }

        let journals = headers
            .into_iter()
            .map(|header| {
                let lines = lines_by_journal.remove(&header.id).unwrap_or_default();
                JournalWithLines { header, lines }
            })
            .collect();

        Ok((journals, total))
    }

    /// Gets a journal by ID with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal is not found.
    pub async fn get(&self, id: Uuid) -> Result<JournalWithLines, JournalError> {
        let header = journal_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::NotFound(id))?;

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(id))
            .all(&self.db)
            .await?;

        Ok(JournalWithLines { header, lines })
    }

    /// Creates a manual journal after validating balance and accounts.
    ///
    /// # Errors
    ///
    /// Returns an error when the lines are malformed, unbalanced, or
    /// reference accounts that cannot be posted to.
    pub async fn create(&self, input: CreateJournalInput) -> Result<JournalWithLines, JournalError> {
        validate_lines(&input.lines)?;

        for line in &input.lines {
            self.ensure_postable(line.account_id).await?;
        }

        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let journal_id = Uuid::new_v4();
        let header = journal_headers::ActiveModel {
            id: Set(journal_id),
            entry_date: Set(input.entry_date),
            description: Set(input.description),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let line_models: Vec<journal_lines::ActiveModel> = input
            .lines
            .iter()
            .map(|line| journal_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                journal_id: Set(journal_id),
                account_id: Set(line.account_id),
                debit: Set(line.debit),
                credit: Set(line.credit),
                created_at: Set(now),
            })
            .collect();
        journal_lines::Entity::insert_many(line_models).exec(&txn).await?;

        txn.commit().await?;

        self.get(header.id).await
    }

    /// Deletes a journal; lines cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal is not found.
    pub async fn delete(&self, id: Uuid) -> Result<(), JournalError> {
        journal_headers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::NotFound(id))?;

        journal_headers::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn ensure_postable(&self, account_id: Uuid) -> Result<(), JournalError> {
        let account = chart_of_accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::AccountNotFound(account_id))?;

        if !account.is_active {
            return Err(JournalError::NotPostable(account_id));
        }

        let children = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::ParentId.eq(account_id))
            .count(&self.db)
            .await?;
        if children > 0 {
            return Err(JournalError::NotPostable(account_id));
        }

        Ok(())
    }
}

/// Validates manual journal lines: at least two, each single-sided, and
/// balanced overall.
fn validate_lines(lines: &[JournalLineInput]) -> Result<(), JournalError> {
    if lines.len() < 2 {
        return Err(JournalError::InsufficientLines);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    for line in lines {
        let single_sided = (line.debit > Decimal::ZERO && line.credit == Decimal::ZERO)
            || (line.credit > Decimal::ZERO && line.debit == Decimal::ZERO);
        if !single_sided {
            return Err(JournalError::InvalidLine);
        }
        total_debit += line.debit;
        total_credit += line.credit;
    }
    if total_debit != total_credit {
        return Err(JournalError::Unbalanced {
            debit: total_debit,
            credit: total_credit,
        });
    }
    Ok(())
}

/// Inserts a journal header plus the lines expanded from balanced pairs.
///
/// Every posting path (savings approval, bulk import, loan disbursement,
/// installment payment, cash sale) writes its journal through this one
/// function inside its own transaction.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub(crate) async fn insert_posting<C: ConnectionTrait>(
    conn: &C,
    entry_date: chrono::DateTime<chrono::FixedOffset>,
    description: &str,
    pairs: &[LinePair],
) -> Result<Uuid, DbErr> {
    let now = Utc::now().into();
    let journal_id = Uuid::new_v4();

    journal_headers::ActiveModel {
        id: Set(journal_id),
        entry_date: Set(entry_date),
        description: Set(description.to_string()),
        created_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut lines = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        for (account_id, debit, credit) in pair.lines() {
            lines.push(journal_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                journal_id: Set(journal_id),
                account_id: Set(account_id),
                debit: Set(debit),
                credit: Set(credit),
                created_at: Set(now),
            });
        }
    }
    journal_lines::Entity::insert_many(lines).exec(conn).await?;

    Ok(journal_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            debit,
            credit,
        }
    }

    #[test]
    fn test_balanced_lines_pass() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_multi_line_journal_balances_as_a_whole() {
        let lines = vec![
            line(dec!(60), dec!(0)),
            line(dec!(40), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![line(dec!(100), dec!(0))];
        assert!(matches!(
            validate_lines(&lines),
            Err(JournalError::InsufficientLines)
        ));
    }

    #[test]
    fn test_unbalanced_rejected() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(60))];
        assert!(matches!(
            validate_lines(&lines),
            Err(JournalError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_double_sided_line_rejected() {
        let lines = vec![line(dec!(100), dec!(100)), line(dec!(0), dec!(0))];
        assert!(matches!(
            validate_lines(&lines),
            Err(JournalError::InvalidLine)
        ));
    }
}
