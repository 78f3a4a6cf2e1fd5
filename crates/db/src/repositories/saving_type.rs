//! Saving type repository, including ledger account mapping.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{chart_of_accounts, saving_types, sea_orm_active_enums::SavingTypeKind};

/// Error types for saving type operations.
#[derive(Debug, thiserror::Error)]
pub enum SavingTypeError {
    /// Saving type not found.
    #[error("Saving type not found: {0}")]
    NotFound(Uuid),

    /// Name already exists.
    #[error("Saving type '{0}' already exists")]
    DuplicateName(String),

    /// Mapped account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or updating a saving type.
#[derive(Debug, Clone)]
pub struct SavingTypeInput {
    /// Type name (must be unique).
    pub name: String,
    /// Posting direction of the type.
    pub kind: SavingTypeKind,
}

/// Saving type repository for CRUD and account mapping.
#[derive(Debug, Clone)]
pub struct SavingTypeRepository {
    db: DatabaseConnection,
}

impl SavingTypeRepository {
    /// Creates a new saving type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all saving types ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<saving_types::Model>, SavingTypeError> {
        let types = saving_types::Entity::find()
            .order_by_asc(saving_types::Column::Name)
            .all(&self.db)
            .await?;
        Ok(types)
    }

    /// Creates a new saving type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken.
    pub async fn create(&self, input: SavingTypeInput) -> Result<saving_types::Model, SavingTypeError> {
        let existing = saving_types::Entity::find()
            .filter(saving_types::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(SavingTypeError::DuplicateName(input.name));
        }

        let now = Utc::now().into();
        let saving_type = saving_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            kind: Set(input.kind),
            account_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(saving_type.insert(&self.db).await?)
    }

    /// Updates a saving type's name and kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: SavingTypeInput,
    ) -> Result<saving_types::Model, SavingTypeError> {
        let saving_type = saving_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SavingTypeError::NotFound(id))?;

        let mut active: saving_types::ActiveModel = saving_type.into();
        active.name = Set(input.name);
        active.kind = Set(input.kind);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a saving type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), SavingTypeError> {
        saving_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SavingTypeError::NotFound(id))?;

        saving_types::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Maps a saving type to a ledger account, or clears the mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the type or the account does not exist.
    pub async fn map_account(
        &self,
        id: Uuid,
        account_id: Option<Uuid>,
    ) -> Result<saving_types::Model, SavingTypeError> {
        let saving_type = saving_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SavingTypeError::NotFound(id))?;

        if let Some(account_id) = account_id {
            chart_of_accounts::Entity::find_by_id(account_id)
                .one(&self.db)
                .await?
                .ok_or(SavingTypeError::AccountNotFound(account_id))?;
        }

        let mut active: saving_types::ActiveModel = saving_type.into();
        active.account_id = Set(account_id);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
