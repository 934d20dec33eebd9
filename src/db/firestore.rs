// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document database client handle.
//!
//! Provides the database-level entry points:
//! - Collection and document references
//! - Write batches
//! - Optimistic transactions with bounded retry

use std::future::Future;
use std::sync::Arc;

use crate::db::batch::WriteBatch;
use crate::db::document::Write;
use crate::db::path::ResourcePath;
use crate::db::reference::{CollectionReference, DocumentReference};
use crate::db::store::{CommitError, CommitResult, Store};
use crate::db::transaction::{self, Transaction, TransactionOptions};
use crate::error::{DbError, Result, TransactionError};

const MAX_PROJECT_ID_LEN: usize = 30;

/// Document database client.
///
/// Cloning is cheap; clones share the same underlying storage.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    project_id: String,
    store: Store,
}

impl Firestore {
    /// Create a new database handle for `project_id`.
    ///
    /// Project IDs are lowercase letters, digits and hyphens, start with a
    /// letter, do not end with a hyphen and are at most 30 characters long.
    pub fn new(project_id: &str) -> Result<Self> {
        validate_project_id(project_id)?;

        tracing::info!(project = project_id, "Opened document database");

        Ok(Self {
            inner: Arc::new(FirestoreInner {
                project_id: project_id.to_string(),
                store: Store::default(),
            }),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Fully qualified database name, e.g. `projects/demo/databases/(default)`.
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.inner.project_id)
    }

    /// Get a reference to the collection at a slash-separated path.
    pub fn collection(&self, path: &str) -> Result<CollectionReference> {
        let path = ResourcePath::collection(path)?;
        Ok(CollectionReference::new(self.clone(), path))
    }

    /// Get a reference to the document at a slash-separated path.
    pub fn doc(&self, path: &str) -> Result<DocumentReference> {
        let path = ResourcePath::document(path)?;
        Ok(DocumentReference::new(self.clone(), path))
    }

    /// Create an empty write batch.
    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new(self.clone())
    }

    /// Run `update_function` in a transaction with the default options
    /// (5 attempts).
    pub async fn run_transaction<F, Fut, T, E>(
        &self,
        update_function: F,
    ) -> std::result::Result<T, TransactionError<E>>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        transaction::run(self, TransactionOptions::default(), update_function).await
    }

    /// Run `update_function` in a transaction with explicit retry options.
    pub async fn run_transaction_with_options<F, Fut, T, E>(
        &self,
        options: TransactionOptions,
        update_function: F,
    ) -> std::result::Result<T, TransactionError<E>>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        transaction::run(self, options, update_function).await
    }

    /// Number of documents currently stored, across all collections.
    pub async fn document_count(&self) -> usize {
        self.inner.store.document_count().await
    }

    /// Whether two handles refer to the same database.
    pub fn same_database(&self, other: &Firestore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Commit writes outside a transaction (no read set).
    pub(crate) async fn commit_writes(&self, writes: &[Write]) -> Result<CommitResult> {
        let result = self
            .inner
            .store
            .commit(&Default::default(), writes)
            .await
            .map_err(|e| match e {
                CommitError::Rejected(err) => err,
                // Blind writes carry no read set, so a conflict cannot occur.
                CommitError::Conflict { path, .. } => {
                    DbError::InvalidArgument(format!("unexpected conflict on {}", path))
                }
            })?;

        tracing::debug!(
            version = result.version,
            writes = result.write_count,
            "Committed writes"
        );

        Ok(result)
    }

    /// Reject references created from a different database handle.
    pub(crate) fn check_owner(&self, doc: &DocumentReference) -> Result<()> {
        if !self.same_database(doc.firestore()) {
            return Err(DbError::InvalidArgument(format!(
                "document reference {} belongs to a different database",
                doc.path()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Firestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firestore")
            .field("project_id", &self.inner.project_id)
            .finish_non_exhaustive()
    }
}

fn validate_project_id(project_id: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(DbError::InvalidArgument(format!(
            "invalid project id '{}': {}",
            project_id, reason
        )))
    };

    if project_id.is_empty() {
        return invalid("must not be empty");
    }
    if project_id.len() > MAX_PROJECT_ID_LEN {
        return invalid("must be at most 30 characters");
    }
    if !project_id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return invalid("must start with a lowercase letter");
    }
    if !project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("may only contain lowercase letters, digits and hyphens");
    }
    if project_id.ends_with('-') {
        return invalid("must not end with a hyphen");
    }
    Ok(())
}
