// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Versioned in-memory document storage.
//!
//! Every commit bumps a global sequence number and stamps it on each document
//! it touches. A version of `0` stands for "document does not exist", so a
//! read set can also guard against concurrent creation and deletion.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::document::{DocumentData, Write};
use crate::db::path::ResourcePath;
use crate::error::DbError;

/// Version marker for documents that do not exist.
pub(crate) const MISSING_VERSION: u64 = 0;

#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub data: DocumentData,
    pub version: u64,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: BTreeMap<ResourcePath, StoredDocument>,
    sequence: u64,
}

/// Successful commit metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitResult {
    /// Sequence number stamped on every document written by the commit.
    pub version: u64,
    pub commit_time: DateTime<Utc>,
    pub write_count: usize,
}

/// Why a commit did not apply.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CommitError {
    /// A document in the read set changed since it was read.
    Conflict {
        path: ResourcePath,
        expected: u64,
        actual: u64,
    },
    /// A write could not be applied; nothing was written.
    Rejected(DbError),
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    pub(crate) async fn read(&self, path: &ResourcePath) -> Option<StoredDocument> {
        self.state.read().await.documents.get(path).cloned()
    }

    /// Direct children of a collection, ordered by document ID.
    pub(crate) async fn list(
        &self,
        collection: &ResourcePath,
    ) -> Vec<(ResourcePath, StoredDocument)> {
        let depth = collection.len() + 1;
        self.state
            .read()
            .await
            .documents
            .iter()
            .filter(|(path, _)| path.len() == depth && path.parent().as_ref() == Some(collection))
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect()
    }

    pub(crate) async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }

    /// Validate the read set and apply `writes` as one atomic step.
    ///
    /// Either every write lands with the same new version or none does.
    pub(crate) async fn commit(
        &self,
        read_set: &HashMap<ResourcePath, u64>,
        writes: &[Write],
    ) -> Result<CommitResult, CommitError> {
        let mut state = self.state.write().await;

        for (path, expected) in read_set {
            let actual = state
                .documents
                .get(path)
                .map(|doc| doc.version)
                .unwrap_or(MISSING_VERSION);
            if actual != *expected {
                return Err(CommitError::Conflict {
                    path: path.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }

        // Stage every write against a scratch view first so a late failure
        // leaves the store untouched.
        let mut staged: BTreeMap<ResourcePath, Option<DocumentData>> = BTreeMap::new();
        for write in writes {
            let current = match staged.get(&write.path) {
                Some(pending) => pending.clone(),
                None => state.documents.get(&write.path).map(|d| d.data.clone()),
            };
            let next = write
                .op
                .apply(&write.path, current.as_ref())
                .map_err(CommitError::Rejected)?;
            staged.insert(write.path.clone(), next);
        }

        state.sequence += 1;
        let version = state.sequence;
        let commit_time = Utc::now();

        for (path, next) in staged {
            match next {
                Some(data) => {
                    let create_time = state
                        .documents
                        .get(&path)
                        .map(|d| d.create_time)
                        .unwrap_or(commit_time);
                    state.documents.insert(
                        path,
                        StoredDocument {
                            data,
                            version,
                            create_time,
                            update_time: commit_time,
                        },
                    );
                }
                None => {
                    state.documents.remove(&path);
                }
            }
        }

        Ok(CommitResult {
            version,
            commit_time,
            write_count: writes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::document::WriteOp;
    use serde_json::json;

    fn set(path: &str, value: serde_json::Value) -> Write {
        Write {
            path: ResourcePath::document(path).unwrap(),
            op: WriteOp::Set(value.as_object().unwrap().clone()),
        }
    }

    #[tokio::test]
    async fn test_commit_stamps_single_version() {
        let store = Store::default();
        let result = store
            .commit(
                &HashMap::new(),
                &[set("cities/a", json!({"n": 1})), set("cities/b", json!({"n": 2}))],
            )
            .await
            .unwrap();

        assert_eq!(result.write_count, 2);
        let a = store.read(&ResourcePath::document("cities/a").unwrap()).await.unwrap();
        let b = store.read(&ResourcePath::document("cities/b").unwrap()).await.unwrap();
        assert_eq!(a.version, result.version);
        assert_eq!(b.version, result.version);
    }

    #[tokio::test]
    async fn test_stale_read_set_conflicts() {
        let store = Store::default();
        let path = ResourcePath::document("cities/a").unwrap();
        store
            .commit(&HashMap::new(), &[set("cities/a", json!({"n": 1}))])
            .await
            .unwrap();

        // Read set claims the document was missing.
        let read_set = HashMap::from([(path.clone(), MISSING_VERSION)]);
        let err = store
            .commit(&read_set, &[set("cities/a", json!({"n": 2}))])
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::Conflict { expected: 0, actual: 1, .. }));
        let doc = store.read(&path).await.unwrap();
        assert_eq!(doc.data.get("n"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_rejected_write_applies_nothing() {
        let store = Store::default();
        let update_missing = Write {
            path: ResourcePath::document("cities/ghost").unwrap(),
            op: WriteOp::Update(json!({"n": 1}).as_object().unwrap().clone()),
        };

        let err = store
            .commit(&HashMap::new(), &[set("cities/a", json!({"n": 1})), update_missing])
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::Rejected(DbError::NotFound(_))));
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_returns_direct_children_only() {
        let store = Store::default();
        store
            .commit(
                &HashMap::new(),
                &[
                    set("states/ca", json!({})),
                    set("states/ca/cities/sf", json!({})),
                    set("states/or", json!({})),
                    set("statesx/zz", json!({})),
                ],
            )
            .await
            .unwrap();

        let listed = store.list(&ResourcePath::collection("states").unwrap()).await;
        let ids: Vec<_> = listed.iter().map(|(p, _)| p.id().to_string()).collect();
        assert_eq!(ids, vec!["ca", "or"]);
    }

    #[tokio::test]
    async fn test_delete_then_recreate_resets_create_time() {
        let store = Store::default();
        let path = ResourcePath::document("cities/a").unwrap();
        store
            .commit(&HashMap::new(), &[set("cities/a", json!({}))])
            .await
            .unwrap();
        store
            .commit(
                &HashMap::new(),
                &[Write {
                    path: path.clone(),
                    op: WriteOp::Delete,
                }],
            )
            .await
            .unwrap();
        assert!(store.read(&path).await.is_none());

        let result = store
            .commit(&HashMap::new(), &[set("cities/a", json!({}))])
            .await
            .unwrap();
        let doc = store.read(&path).await.unwrap();
        assert_eq!(doc.create_time, result.commit_time);
        assert_eq!(doc.version, 3);
    }
}
