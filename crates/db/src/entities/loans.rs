//! `SeaORM` Entity for loans table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LoanStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub loan_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub amount: Decimal,
    pub tenor_months: i32,
    pub purpose: Option<String>,
    pub status: LoanStatus,
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
        belongs_to = "super::loan_types::Entity",
        from = "Column::LoanTypeId",
        to = "super::loan_types::Column::Id"
    )]
    LoanTypes,
    #[sea_orm(has_many = "super::loan_installments::Entity")]
    LoanInstallments,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::loan_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanTypes.def()
    }
}

impl Related<super::loan_installments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanInstallments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
