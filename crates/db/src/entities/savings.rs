//! `SeaORM` Entity for savings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SavingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "savings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub saving_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub amount: Decimal,
    pub date: Date,
    pub status: SavingStatus,
    pub description: Option<String>,
    pub journal_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::saving_types::Entity",
        from = "Column::SavingTypeId",
        to = "super::saving_types::Column::Id"
    )]
    SavingTypes,
    #[sea_orm(
        belongs_to = "super::journal_headers::Entity",
        from = "Column::JournalId",
        to = "super::journal_headers::Column::Id"
    )]
    JournalHeaders,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::saving_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingTypes.def()
    }
}

impl Related<super::journal_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
