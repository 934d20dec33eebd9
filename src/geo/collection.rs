// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geo-aware collection and document references.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{
    CollectionReference, CommitResult, DocumentReference, DocumentSnapshot, QuerySnapshot,
};
use crate::error::Result;
use crate::geo::point::{geo_document, geo_fields, location_from_data, GeoPoint};

/// Collection whose documents carry a [`GeoPoint`] location.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoCollectionReference {
    inner: CollectionReference,
    location_field: Arc<str>,
}

impl GeoCollectionReference {
    pub(crate) fn new(inner: CollectionReference, location_field: Arc<str>) -> Self {
        Self {
            inner,
            location_field,
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn path(&self) -> String {
        self.inner.path()
    }

    /// The wrapped collection reference.
    pub fn native(&self) -> &CollectionReference {
        &self.inner
    }

    pub fn doc(&self, id: &str) -> Result<GeoDocumentReference> {
        let doc = self.inner.doc(id)?;
        Ok(GeoDocumentReference::new(doc, self.location_field.clone()))
    }

    pub fn doc_auto(&self) -> GeoDocumentReference {
        GeoDocumentReference::new(self.inner.doc_auto(), self.location_field.clone())
    }

    /// Create a geo document with an auto-generated ID.
    pub async fn add<T: Serialize + ?Sized>(&self, data: &T) -> Result<GeoDocumentReference> {
        let doc = self.doc_auto();
        doc.set(data).await?;
        Ok(doc)
    }

    pub async fn get(&self) -> Result<GeoQuerySnapshot> {
        let snapshot = self.inner.get().await?;
        Ok(GeoQuerySnapshot::new(snapshot, &self.location_field))
    }
}

/// Document reference that validates locations on write.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoDocumentReference {
    inner: DocumentReference,
    location_field: Arc<str>,
}

impl GeoDocumentReference {
    pub(crate) fn new(inner: DocumentReference, location_field: Arc<str>) -> Self {
        Self {
            inner,
            location_field,
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn path(&self) -> String {
        self.inner.path()
    }

    pub fn native(&self) -> &DocumentReference {
        &self.inner
    }

    pub fn location_field(&self) -> &str {
        &self.location_field
    }

    pub fn parent(&self) -> GeoCollectionReference {
        GeoCollectionReference::new(self.inner.parent(), self.location_field.clone())
    }

    pub fn collection(&self, path: &str) -> Result<GeoCollectionReference> {
        let collection = self.inner.collection(path)?;
        Ok(GeoCollectionReference::new(
            collection,
            self.location_field.clone(),
        ))
    }

    pub async fn get(&self) -> Result<GeoDocumentSnapshot> {
        let snapshot = self.inner.get().await?;
        Ok(GeoDocumentSnapshot::new(snapshot, self.location_field.clone()))
    }

    /// Overwrite the document. `data` must contain a valid location.
    pub async fn set<T: Serialize + ?Sized>(&self, data: &T) -> Result<CommitResult> {
        let data = geo_document(data, &self.location_field)?;
        self.inner.set(&data).await
    }

    /// Deep-merge into the document. A location, if present, must be valid.
    pub async fn set_merge<T: Serialize + ?Sized>(&self, data: &T) -> Result<CommitResult> {
        let data = geo_fields(data, &self.location_field)?;
        self.inner.set_merge(&data).await
    }

    /// Update fields of an existing document. A location, if present, must be valid.
    pub async fn update<T: Serialize + ?Sized>(&self, fields: &T) -> Result<CommitResult> {
        let fields = geo_fields(fields, &self.location_field)?;
        self.inner.update(&fields).await
    }

    pub async fn delete(&self) -> Result<CommitResult> {
        self.inner.delete().await
    }
}

/// Snapshot of a geo document.
#[derive(Clone, Debug)]
pub struct GeoDocumentSnapshot {
    inner: DocumentSnapshot,
    location_field: Arc<str>,
}

impl GeoDocumentSnapshot {
    pub(crate) fn new(inner: DocumentSnapshot, location_field: Arc<str>) -> Self {
        Self {
            inner,
            location_field,
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn exists(&self) -> bool {
        self.inner.exists()
    }

    pub fn native(&self) -> &DocumentSnapshot {
        &self.inner
    }

    /// Reference to the document this snapshot was read from.
    pub fn reference(&self) -> GeoDocumentReference {
        GeoDocumentReference::new(self.inner.reference().clone(), self.location_field.clone())
    }

    /// Stored location. `Ok(None)` when the document or the field is missing.
    pub fn location(&self) -> Result<Option<GeoPoint>> {
        match self.inner.data() {
            Some(data) => location_from_data(data, &self.location_field),
            None => Ok(None),
        }
    }

    /// Stored location as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Result<Option<geo::Point<f64>>> {
        Ok(self.location()?.map(geo::Point::from))
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.inner.data_as()
    }
}

/// Documents read from a geo collection.
#[derive(Clone, Debug, Default)]
pub struct GeoQuerySnapshot {
    docs: Vec<GeoDocumentSnapshot>,
}

impl GeoQuerySnapshot {
    fn new(snapshot: QuerySnapshot, location_field: &Arc<str>) -> Self {
        let docs = snapshot
            .into_iter()
            .map(|doc| GeoDocumentSnapshot::new(doc, location_field.clone()))
            .collect();
        Self { docs }
    }

    pub fn docs(&self) -> &[GeoDocumentSnapshot] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
