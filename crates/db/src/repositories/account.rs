//! Account repository for chart of accounts database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use chrono::Utc;
use uuid::Uuid;

use crate::entities::{chart_of_accounts, journal_lines, sea_orm_active_enums::AccountType};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account number already exists.
    #[error("Account number '{0}' already exists")]
    DuplicateNumber(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Cannot delete account because it has journal lines.
    #[error("Cannot delete account: account has {0} journal lines")]
    HasJournalLines(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number (must be unique).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Parent account ID for hierarchical structure.
    pub parent_id: Option<Uuid>,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New account name.
    pub name: Option<String>,
    /// New account type.
    pub account_type: Option<AccountType>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all accounts ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<chart_of_accounts::Model>, AccountError> {
        let accounts = chart_of_accounts::Entity::find()
            .order_by_asc(chart_of_accounts::Column::AccountNumber)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Lists active leaf accounts, the only ones journal lines may reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_journalable(&self) -> Result<Vec<chart_of_accounts::Model>, AccountError> {
        let accounts = self.list().await?;

        let parent_ids: std::collections::HashSet<Uuid> =
            accounts.iter().filter_map(|a| a.parent_id).collect();

        Ok(accounts
            .into_iter()
            .filter(|a| a.is_active && !parent_ids.contains(&a.id))
            .collect())
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the number is taken or the parent does not exist.
    pub async fn create(
        &self,
        input: CreateAccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let existing = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::AccountNumber.eq(&input.account_number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateNumber(input.account_number));
        }

        if let Some(parent_id) = input.parent_id {
            chart_of_accounts::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(parent_id))?;
        }

        let now = Utc::now().into();
        let account = chart_of_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_number: Set(input.account_number),
            name: Set(input.name),
            account_type: Set(input.account_type),
            parent_id: Set(input.parent_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Updates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<chart_of_accounts::Model, AccountError> {
        let account = chart_of_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut active: chart_of_accounts::ActiveModel = account.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an account.
    ///
    /// Refused while journal lines still reference the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or has lines.
    pub async fn delete(&self, id: Uuid) -> Result<(), AccountError> {
        chart_of_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let line_count = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id))
            .count(&self.db)
            .await?;
        if line_count > 0 {
            return Err(AccountError::HasJournalLines(line_count));
        }

        chart_of_accounts::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

/// Finds an account by its account number on any connection.
///
/// Posting paths resolve the designated cash account through this lookup
/// inside their own transaction scope.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_account_by_number<C: ConnectionTrait>(
    conn: &C,
    account_number: &str,
) -> Result<Option<chart_of_accounts::Model>, DbErr> {
    chart_of_accounts::Entity::find()
        .filter(chart_of_accounts::Column::AccountNumber.eq(account_number))
        .one(conn)
        .await
}
