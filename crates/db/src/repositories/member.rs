//! Member repository for cooperative member database operations.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use arta_shared::PageRequest;

use crate::entities::{members, sea_orm_active_enums::MemberStatus};

/// Error types for member operations.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    /// Member not found.
    #[error("Member not found: {0}")]
    NotFound(Uuid),

    /// Cooperative number already exists.
    #[error("Cooperative number '{0}' already exists")]
    DuplicateNumber(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct CreateMemberInput {
    /// Cooperative number (must be unique).
    pub cooperative_number: String,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Join date; today when absent.
    pub joined_at: Option<NaiveDate>,
}

/// Input for updating a member profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberInput {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
}

/// Member repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists members with optional name search and status filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<MemberStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<members::Model>, u64), MemberError> {
        let mut query = members::Entity::find();
        if let Some(search) = search {
            query = query.filter(members::Column::Name.contains(search));
        }
        if let Some(status) = status {
            query = query.filter(members::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(members::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Lists active members ordered by name, for the bulk template export.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<members::Model>, MemberError> {
        let rows = members::Entity::find()
            .filter(members::Column::Status.eq(MemberStatus::Active))
            .order_by_asc(members::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Finds a member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the member does not exist.
    pub async fn find_by_id(&self, id: Uuid) -> Result<members::Model, MemberError> {
        members::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(MemberError::NotFound(id))
    }

    /// Registers a new member with `Pending` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the cooperative number is taken.
    pub async fn create(&self, input: CreateMemberInput) -> Result<members::Model, MemberError> {
        let existing = members::Entity::find()
            .filter(members::Column::CooperativeNumber.eq(&input.cooperative_number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(MemberError::DuplicateNumber(input.cooperative_number));
        }

        let now = Utc::now();
        let member = members::ActiveModel {
            id: Set(Uuid::new_v4()),
            cooperative_number: Set(input.cooperative_number),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            status: Set(MemberStatus::Pending),
            joined_at: Set(input.joined_at.unwrap_or_else(|| now.date_naive())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(member.insert(&self.db).await?)
    }

    /// Updates a member profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the member does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateMemberInput,
    ) -> Result<members::Model, MemberError> {
        let member = self.find_by_id(id).await?;

        let mut active: members::ActiveModel = member.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Updates a member's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the member does not exist.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: MemberStatus,
    ) -> Result<members::Model, MemberError> {
        let member = self.find_by_id(id).await?;

        let mut active: members::ActiveModel = member.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
