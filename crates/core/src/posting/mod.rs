//! Journal posting rules for status transitions.
//!
//! This module implements the bookkeeping side of domain state changes:
//! - Status enums and their legal transitions
//! - The approval guard that makes retries safe
//! - Balanced debit/credit pair construction
//! - Error types for posting operations

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PostingError;
pub use service::PostingService;
pub use types::{LinePair, LoanStatus, PostingPlan, SavingStatus, SavingTypeKind};
