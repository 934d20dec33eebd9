// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use geofirestore::{DbError, TransactionError};

#[test]
fn test_transaction_error_kinds() {
    let err: TransactionError<DbError> = TransactionError::Aborted(DbError::ReadAfterWrite);
    assert!(err.is_aborted());
    assert!(!err.is_failed());
    assert_eq!(err.into_aborted(), Some(DbError::ReadAfterWrite));

    let err: TransactionError<DbError> = TransactionError::Failed { attempts: 5 };
    assert!(err.is_failed());
    assert!(!err.is_aborted());
    assert_eq!(err.into_aborted(), None);

    let err: TransactionError<DbError> =
        TransactionError::Commit(DbError::NotFound("cities/sf".to_string()));
    assert!(!err.is_failed());
    assert!(!err.is_aborted());
}

#[test]
fn test_error_messages() {
    let err: TransactionError<String> = TransactionError::Failed { attempts: 5 };
    assert_eq!(
        err.to_string(),
        "Transaction failed after 5 attempts due to conflicting writes"
    );

    let err: TransactionError<String> = TransactionError::Aborted("out of stock".to_string());
    assert_eq!(err.to_string(), "Transaction aborted: out of stock");

    let err = DbError::InvalidPath("a//b".to_string());
    assert_eq!(err.to_string(), "Invalid path: a//b");
}

#[test]
fn test_serde_errors_convert() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err = DbError::from(parse_err);
    assert!(matches!(err, DbError::Serialization(_)));
}
