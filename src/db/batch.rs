// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Write batches: buffered writes committed as one atomic operation.

use serde::Serialize;

use crate::db::document::{to_document_data, Write, WriteOp};
use crate::db::firestore::Firestore;
use crate::db::reference::DocumentReference;
use crate::db::store::CommitResult;
use crate::error::{DbError, Result};

/// Maximum number of writes in one batch.
pub const MAX_BATCH_WRITES: usize = 500;

/// A set of writes applied atomically on [`commit`](WriteBatch::commit).
///
/// Nothing is visible until commit. Commit consumes the batch, so a batch
/// can only be committed once.
#[derive(Debug)]
pub struct WriteBatch {
    db: Firestore,
    writes: Vec<Write>,
}

impl WriteBatch {
    pub(crate) fn new(db: Firestore) -> Self {
        Self {
            db,
            writes: Vec::new(),
        }
    }

    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        doc: &DocumentReference,
        data: &T,
    ) -> Result<&mut Self> {
        let data = to_document_data(data)?;
        self.push(doc, WriteOp::Set(data))
    }

    pub fn set_merge<T: Serialize + ?Sized>(
        &mut self,
        doc: &DocumentReference,
        data: &T,
    ) -> Result<&mut Self> {
        let data = to_document_data(data)?;
        self.push(doc, WriteOp::Merge(data))
    }

    /// Queue a field update. The commit fails if the document does not exist then.
    pub fn update<T: Serialize + ?Sized>(
        &mut self,
        doc: &DocumentReference,
        fields: &T,
    ) -> Result<&mut Self> {
        let fields = to_document_data(fields)?;
        self.push(doc, WriteOp::Update(fields))
    }

    pub fn delete(&mut self, doc: &DocumentReference) -> Result<&mut Self> {
        self.push(doc, WriteOp::Delete)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply all queued writes atomically.
    pub async fn commit(self) -> Result<CommitResult> {
        let result = self.db.commit_writes(&self.writes).await?;
        tracing::debug!(writes = result.write_count, "Write batch committed");
        Ok(result)
    }

    fn push(&mut self, doc: &DocumentReference, op: WriteOp) -> Result<&mut Self> {
        self.db.check_owner(doc)?;
        if self.writes.len() >= MAX_BATCH_WRITES {
            return Err(DbError::InvalidArgument(format!(
                "a batch may contain at most {} writes",
                MAX_BATCH_WRITES
            )));
        }
        self.writes.push(Write {
            path: doc.resource_path().clone(),
            op,
        });
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_nothing_visible_before_commit() {
        let db = Firestore::new("test-project").unwrap();
        let doc = db.doc("cities/sf").unwrap();

        let mut batch = db.batch();
        batch.set(&doc, &json!({"name": "SF"})).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(!doc.get().await.unwrap().exists());

        batch.commit().await.unwrap();
        assert!(doc.get().await.unwrap().exists());
    }

    #[test]
    fn test_batch_limit() {
        let db = Firestore::new("test-project").unwrap();
        let doc = db.doc("cities/sf").unwrap();
        let mut batch = db.batch();

        for _ in 0..MAX_BATCH_WRITES {
            batch.delete(&doc).unwrap();
        }
        assert!(matches!(
            batch.delete(&doc),
            Err(DbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_foreign_reference() {
        let db = Firestore::new("one").unwrap();
        let other = Firestore::new("two").unwrap();
        let foreign = other.doc("cities/sf").unwrap();

        let mut batch = db.batch();
        assert!(matches!(
            batch.set(&foreign, &json!({})),
            Err(DbError::InvalidArgument(_))
        ));
        assert!(batch.is_empty());
    }
}
