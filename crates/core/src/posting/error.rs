//! Error types for posting operations.

use thiserror::Error;

/// Errors that can occur while planning a journal posting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostingError {
    /// Posting amount must be positive.
    #[error("Posting amount must be positive")]
    NonPositiveAmount,

    /// Debit and credit accounts must differ.
    #[error("Debit and credit accounts must differ")]
    SameAccount,
}
