//! Loan type repository, including ledger account mapping.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{chart_of_accounts, loan_types};

/// Error types for loan type operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanTypeError {
    /// Loan type not found.
    #[error("Loan type not found: {0}")]
    NotFound(Uuid),

    /// Name already exists.
    #[error("Loan type '{0}' already exists")]
    DuplicateName(String),

    /// Mapped account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Interest rate cannot be negative.
    #[error("Interest rate cannot be negative")]
    NegativeRate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating a loan type.
#[derive(Debug, Clone)]
pub struct LoanTypeInput {
    /// Type name (must be unique).
    pub name: String,
    /// Flat monthly interest rate, in percent.
    pub monthly_interest_rate: Decimal,
}

/// Loan type repository for CRUD and account mapping.
#[derive(Debug, Clone)]
pub struct LoanTypeRepository {
    db: DatabaseConnection,
}

impl LoanTypeRepository {
    /// Creates a new loan type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all loan types ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<loan_types::Model>, LoanTypeError> {
        let types = loan_types::Entity::find()
            .order_by_asc(loan_types::Column::Name)
            .all(&self.db)
            .await?;
        Ok(types)
    }

    /// Creates a new loan type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the rate is negative.
    pub async fn create(&self, input: LoanTypeInput) -> Result<loan_types::Model, LoanTypeError> {
        if input.monthly_interest_rate < Decimal::ZERO {
            return Err(LoanTypeError::NegativeRate);
        }

        let existing = loan_types::Entity::find()
            .filter(loan_types::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(LoanTypeError::DuplicateName(input.name));
        }

        let now = Utc::now().into();
        let loan_type = loan_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            monthly_interest_rate: Set(input.monthly_interest_rate),
            account_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(loan_type.insert(&self.db).await?)
    }

    /// Updates a loan type's name and rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist or the rate is negative.
    pub async fn update(
        &self,
        id: Uuid,
        input: LoanTypeInput,
    ) -> Result<loan_types::Model, LoanTypeError> {
        if input.monthly_interest_rate < Decimal::ZERO {
            return Err(LoanTypeError::NegativeRate);
        }

        let loan_type = loan_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LoanTypeError::NotFound(id))?;

        let mut active: loan_types::ActiveModel = loan_type.into();
        active.name = Set(input.name);
        active.monthly_interest_rate = Set(input.monthly_interest_rate);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a loan type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), LoanTypeError> {
        loan_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LoanTypeError::NotFound(id))?;

        loan_types::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Maps a loan type to a ledger account, or clears the mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the type or the account does not exist.
    pub async fn map_account(
        &self,
        id: Uuid,
        account_id: Option<Uuid>,
    ) -> Result<loan_types::Model, LoanTypeError> {
        let loan_type = loan_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LoanTypeError::NotFound(id))?;

        if let Some(account_id) = account_id {
            chart_of_accounts::Entity::find_by_id(account_id)
                .one(&self.db)
                .await?
                .ok_or(LoanTypeError::AccountNotFound(account_id))?;
        }

        let mut active: loan_types::ActiveModel = loan_type.into();
        active.account_id = Set(account_id);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
