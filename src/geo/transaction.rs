// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geo-aware transaction handle.

use std::sync::Arc;

use serde::Serialize;

use crate::db::Transaction;
use crate::error::Result;
use crate::geo::collection::{GeoDocumentReference, GeoDocumentSnapshot};
use crate::geo::point::{geo_document, geo_fields};

/// Wraps the [`Transaction`] of one attempt.
///
/// Reads return [`GeoDocumentSnapshot`]s; writes validate locations before
/// they are buffered.
#[derive(Clone, Debug)]
pub struct GeoTransaction {
    inner: Transaction,
    location_field: Arc<str>,
}

impl GeoTransaction {
    pub(crate) fn new(inner: Transaction, location_field: Arc<str>) -> Self {
        Self {
            inner,
            location_field,
        }
    }

    pub fn native(&self) -> &Transaction {
        &self.inner
    }

    pub fn attempt(&self) -> u32 {
        self.inner.attempt()
    }

    pub async fn get(&self, doc: &GeoDocumentReference) -> Result<GeoDocumentSnapshot> {
        let snapshot = self.inner.get(doc.native()).await?;
        Ok(GeoDocumentSnapshot::new(snapshot, self.location_field.clone()))
    }

    pub async fn get_all(&self, docs: &[GeoDocumentReference]) -> Result<Vec<GeoDocumentSnapshot>> {
        let mut snapshots = Vec::with_capacity(docs.len());
        for doc in docs {
            snapshots.push(self.get(doc).await?);
        }
        Ok(snapshots)
    }

    pub fn set<T: Serialize + ?Sized>(&self, doc: &GeoDocumentReference, data: &T) -> Result<&Self> {
        let data = geo_document(data, &self.location_field)?;
        self.inner.set(doc.native(), &data)?;
        Ok(self)
    }

    pub fn set_merge<T: Serialize + ?Sized>(
        &self,
        doc: &GeoDocumentReference,
        data: &T,
    ) -> Result<&Self> {
        let data = geo_fields(data, &self.location_field)?;
        self.inner.set_merge(doc.native(), &data)?;
        Ok(self)
    }

    pub fn update<T: Serialize + ?Sized>(
        &self,
        doc: &GeoDocumentReference,
        fields: &T,
    ) -> Result<&Self> {
        let fields = geo_fields(fields, &self.location_field)?;
        self.inner.update(doc.native(), &fields)?;
        Ok(self)
    }

    pub fn delete(&self, doc: &GeoDocumentReference) -> Result<&Self> {
        self.inner.delete(doc.native())?;
        Ok(self)
    }
}
