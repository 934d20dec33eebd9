// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for document and transaction operations.

/// Errors raised by the document client and the geo layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Transactions require all reads to be executed before all writes")]
    ReadAfterWrite,

    #[error("Transaction is no longer active")]
    TransactionClosed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Failure of a `run_transaction` call.
///
/// `Aborted` carries the update function's own error unchanged and is never
/// retried. `Failed` means every attempt hit a write conflict.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError<E> {
    #[error("Transaction aborted: {0}")]
    Aborted(E),

    #[error("Transaction failed after {attempts} attempts due to conflicting writes")]
    Failed { attempts: u32 },

    #[error("Transaction commit failed: {0}")]
    Commit(DbError),
}

impl<E> TransactionError<E> {
    /// True when the update function itself returned an error.
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransactionError::Aborted(_))
    }

    /// True when the attempt limit was exhausted by conflicts.
    pub fn is_failed(&self) -> bool {
        matches!(self, TransactionError::Failed { .. })
    }

    /// Take back the update function's error, if that is what ended the transaction.
    pub fn into_aborted(self) -> Option<E> {
        match self {
            TransactionError::Aborted(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DbError>;
