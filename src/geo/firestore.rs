// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `GeoFirestore`, the entry point for geo-aware database operations.

use std::future::Future;
use std::sync::Arc;

use crate::db::{Firestore, TransactionOptions};
use crate::error::{DbError, Result, TransactionError};
use crate::geo::batch::GeoWriteBatch;
use crate::geo::collection::{GeoCollectionReference, GeoDocumentReference};
use crate::geo::transaction::GeoTransaction;

/// Field holding a document's [`GeoPoint`](crate::geo::GeoPoint) unless configured otherwise.
pub const DEFAULT_LOCATION_FIELD: &str = "coordinates";

/// Wraps a [`Firestore`] handle and forwards database-level operations,
/// returning geo-aware wrappers.
///
/// Holds no state of its own besides the handle and the location field name.
#[derive(Clone, Debug)]
pub struct GeoFirestore {
    firestore: Firestore,
    location_field: Arc<str>,
}

impl GeoFirestore {
    /// Wrap a database handle, storing locations in [`DEFAULT_LOCATION_FIELD`].
    ///
    /// The handle was validated by [`Firestore::new`], so this cannot fail.
    pub fn new(firestore: Firestore) -> Self {
        Self {
            firestore,
            location_field: Arc::from(DEFAULT_LOCATION_FIELD),
        }
    }

    /// Wrap a database handle, storing locations in `field`.
    pub fn with_location_field(firestore: Firestore, field: &str) -> Result<Self> {
        if field.is_empty() || field.contains('.') {
            return Err(DbError::InvalidArgument(format!(
                "invalid location field '{}': must be a non-empty top-level field name",
                field
            )));
        }
        Ok(Self {
            firestore,
            location_field: Arc::from(field),
        })
    }

    /// The wrapped database handle.
    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub fn location_field(&self) -> &str {
        &self.location_field
    }

    /// Get a reference to the collection at a slash-separated path.
    ///
    /// Path errors come straight from [`Firestore::collection`].
    pub fn collection(&self, path: &str) -> Result<GeoCollectionReference> {
        let collection = self.firestore.collection(path)?;
        Ok(GeoCollectionReference::new(
            collection,
            self.location_field.clone(),
        ))
    }

    /// Get a reference to the document at a slash-separated path.
    pub fn doc(&self, path: &str) -> Result<GeoDocumentReference> {
        let doc = self.firestore.doc(path)?;
        Ok(GeoDocumentReference::new(doc, self.location_field.clone()))
    }

    /// Create a write batch for performing multiple writes as one atomic operation.
    pub fn batch(&self) -> GeoWriteBatch {
        GeoWriteBatch::new(self.firestore.batch(), self.location_field.clone())
    }

    /// Execute `update_function` and commit the writes it buffered.
    ///
    /// If any document read in the transaction changed before commit, the
    /// function is run again with a fresh [`GeoTransaction`], for at most 5
    /// attempts. An `Err` from the function ends the transaction immediately
    /// as [`TransactionError::Aborted`]; running out of attempts yields
    /// [`TransactionError::Failed`].
    pub async fn run_transaction<F, Fut, T, E>(
        &self,
        update_function: F,
    ) -> std::result::Result<T, TransactionError<E>>
    where
        F: FnMut(GeoTransaction) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.run_transaction_with_options(TransactionOptions::default(), update_function)
            .await
    }

    /// Like [`run_transaction`](Self::run_transaction) with explicit retry options.
    pub async fn run_transaction_with_options<F, Fut, T, E>(
        &self,
        options: TransactionOptions,
        mut update_function: F,
    ) -> std::result::Result<T, TransactionError<E>>
    where
        F: FnMut(GeoTransaction) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let location_field = self.location_field.clone();
        self.firestore
            .run_transaction_with_options(options, move |transaction| {
                update_function(GeoTransaction::new(transaction, location_field.clone()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firestore() -> Firestore {
        Firestore::new("test-project").unwrap()
    }

    #[test]
    fn test_default_location_field() {
        let geo = GeoFirestore::new(firestore());
        assert_eq!(geo.location_field(), DEFAULT_LOCATION_FIELD);
    }

    #[test]
    fn test_custom_location_field_validation() {
        assert!(GeoFirestore::with_location_field(firestore(), "position").is_ok());
        assert!(matches!(
            GeoFirestore::with_location_field(firestore(), ""),
            Err(DbError::InvalidArgument(_))
        ));
        assert!(matches!(
            GeoFirestore::with_location_field(firestore(), "a.b"),
            Err(DbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_collection_path_errors_pass_through() {
        let geo = GeoFirestore::new(firestore());
        let direct = geo.firestore().collection("a/b").unwrap_err();
        let wrapped = geo.collection("a/b").unwrap_err();
        assert_eq!(direct, wrapped);
    }
}
