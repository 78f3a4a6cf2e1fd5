//! `SeaORM` entity definitions.

pub mod chart_of_accounts;
pub mod journal_headers;
pub mod journal_lines;
pub mod loan_installments;
pub mod loan_types;
pub mod loans;
pub mod members;
pub mod products;
pub mod sales;
pub mod saving_types;
pub mod savings;
pub mod sea_orm_active_enums;
