// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection and document references, and the snapshots they read.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::db::document::{get_field, to_document_data, DocumentData, Write, WriteOp};
use crate::db::firestore::Firestore;
use crate::db::path::{auto_id, ResourcePath};
use crate::db::store::{CommitResult, StoredDocument, MISSING_VERSION};
use crate::error::{DbError, Result};

/// Reference to a collection. Creating one performs no I/O.
#[derive(Clone, Debug)]
pub struct CollectionReference {
    db: Firestore,
    path: ResourcePath,
}

impl CollectionReference {
    pub(crate) fn new(db: Firestore, path: ResourcePath) -> Self {
        Self { db, path }
    }

    /// Collection ID (last path segment).
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Slash-separated path relative to the database root.
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn resource_path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn firestore(&self) -> &Firestore {
        &self.db
    }

    /// Parent document for sub-collections, `None` for root collections.
    pub fn parent(&self) -> Option<DocumentReference> {
        self.path
            .parent()
            .map(|path| DocumentReference::new(self.db.clone(), path))
    }

    /// Reference to a document in this collection.
    ///
    /// `id` may be a relative path (`ca/cities/sf`) as long as it ends at a document.
    pub fn doc(&self, id: &str) -> Result<DocumentReference> {
        let path = self.path.child(id)?;
        if !path.is_document() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a document path",
                path
            )));
        }
        Ok(DocumentReference::new(self.db.clone(), path))
    }

    /// Reference to a new document with an auto-generated ID.
    pub fn doc_auto(&self) -> DocumentReference {
        DocumentReference::new(self.db.clone(), self.path.join_generated(auto_id()))
    }

    /// Create a document with an auto-generated ID.
    pub async fn add<T: Serialize + ?Sized>(&self, data: &T) -> Result<DocumentReference> {
        let doc = self.doc_auto();
        doc.set(data).await?;
        Ok(doc)
    }

    /// Read every document directly inside this collection, ordered by ID.
    pub async fn get(&self) -> Result<QuerySnapshot> {
        let docs = self
            .db
            .store()
            .list(&self.path)
            .await
            .into_iter()
            .map(|(path, stored)| {
                DocumentSnapshot::from_stored(
                    DocumentReference::new(self.db.clone(), path),
                    Some(stored),
                )
            })
            .collect();

        Ok(QuerySnapshot { docs })
    }

    /// References to every document directly inside this collection.
    pub async fn list_documents(&self) -> Vec<DocumentReference> {
        self.db
            .store()
            .list(&self.path)
            .await
            .into_iter()
            .map(|(path, _)| DocumentReference::new(self.db.clone(), path))
            .collect()
    }
}

impl PartialEq for CollectionReference {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.db.same_database(&other.db)
    }
}

/// Reference to a single document. Creating one performs no I/O.
#[derive(Clone, Debug)]
pub struct DocumentReference {
    db: Firestore,
    path: ResourcePath,
}

impl DocumentReference {
    pub(crate) fn new(db: Firestore, path: ResourcePath) -> Self {
        Self { db, path }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn resource_path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn firestore(&self) -> &Firestore {
        &self.db
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionReference {
        // Document paths always have at least two segments.
        let parent = self.path.parent().unwrap_or_else(|| self.path.clone());
        CollectionReference::new(self.db.clone(), parent)
    }

    /// Sub-collection of this document.
    pub fn collection(&self, path: &str) -> Result<CollectionReference> {
        let path = self.path.child(path)?;
        if !path.is_collection() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a collection path",
                path
            )));
        }
        Ok(CollectionReference::new(self.db.clone(), path))
    }

    pub async fn get(&self) -> Result<DocumentSnapshot> {
        let stored = self.db.store().read(&self.path).await;
        Ok(DocumentSnapshot::from_stored(self.clone(), stored))
    }

    /// Overwrite the document with `data`.
    pub async fn set<T: Serialize + ?Sized>(&self, data: &T) -> Result<CommitResult> {
        self.write(WriteOp::Set(to_document_data(data)?)).await
    }

    /// Deep-merge `data` into the document, creating it if needed.
    pub async fn set_merge<T: Serialize + ?Sized>(&self, data: &T) -> Result<CommitResult> {
        self.write(WriteOp::Merge(to_document_data(data)?)).await
    }

    /// Update fields of an existing document. Keys may be dotted field paths.
    ///
    /// Fails with [`DbError::NotFound`] if the document does not exist.
    pub async fn update<T: Serialize + ?Sized>(&self, fields: &T) -> Result<CommitResult> {
        self.write(WriteOp::Update(to_document_data(fields)?)).await
    }

    /// Delete the document. Deleting a missing document succeeds.
    pub async fn delete(&self) -> Result<CommitResult> {
        self.write(WriteOp::Delete).await
    }

    async fn write(&self, op: WriteOp) -> Result<CommitResult> {
        self.db
            .commit_writes(&[Write {
                path: self.path.clone(),
                op,
            }])
            .await
    }
}

impl PartialEq for DocumentReference {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.db.same_database(&other.db)
    }
}

/// Contents of a document at the time it was read.
#[derive(Clone, Debug)]
pub struct DocumentSnapshot {
    reference: DocumentReference,
    data: Option<DocumentData>,
    version: u64,
    create_time: Option<DateTime<Utc>>,
    update_time: Option<DateTime<Utc>>,
    read_time: DateTime<Utc>,
}

impl DocumentSnapshot {
    pub(crate) fn from_stored(reference: DocumentReference, stored: Option<StoredDocument>) -> Self {
        let read_time = Utc::now();
        match stored {
            Some(doc) => Self {
                reference,
                data: Some(doc.data),
                version: doc.version,
                create_time: Some(doc.create_time),
                update_time: Some(doc.update_time),
                read_time,
            },
            None => Self {
                reference,
                data: None,
                version: MISSING_VERSION,
                create_time: None,
                update_time: None,
                read_time,
            },
        }
    }

    pub fn reference(&self) -> &DocumentReference {
        &self.reference
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn path(&self) -> String {
        self.reference.path()
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&DocumentData> {
        self.data.as_ref()
    }

    /// Value of a (possibly dotted) field, if the document and field exist.
    pub fn get(&self, field_path: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| get_field(data, field_path))
    }

    /// Deserialize the document into `T`. Returns `Ok(None)` for missing documents.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.data
            .as_ref()
            .map(|data| serde_json::from_value(Value::Object(data.clone())))
            .transpose()
            .map_err(DbError::from)
    }

    /// Commit sequence number of the last write, `0` if the document is missing.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }

    pub fn update_time(&self) -> Option<DateTime<Utc>> {
        self.update_time
    }

    pub fn read_time(&self) -> DateTime<Utc> {
        self.read_time
    }
}

/// Result of reading a collection.
#[derive(Clone, Debug, Default)]
pub struct QuerySnapshot {
    docs: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn docs(&self) -> &[DocumentSnapshot] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}
