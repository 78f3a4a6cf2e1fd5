//! Core business logic for Arta.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `posting` - Journal posting rules for status transitions
//! - `bulk` - Bulk savings import reconciliation
//! - `schedule` - Loan installment schedule arithmetic

pub mod bulk;
pub mod posting;
pub mod schedule;
