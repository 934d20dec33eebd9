// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geo-aware write batch.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{CommitResult, WriteBatch};
use crate::error::Result;
use crate::geo::collection::GeoDocumentReference;
use crate::geo::point::{geo_document, geo_fields};

/// Wraps exactly one [`WriteBatch`], validating locations as writes are queued.
#[derive(Debug)]
pub struct GeoWriteBatch {
    inner: WriteBatch,
    location_field: Arc<str>,
}

impl GeoWriteBatch {
    pub(crate) fn new(inner: WriteBatch, location_field: Arc<str>) -> Self {
        Self {
            inner,
            location_field,
        }
    }

    pub fn native(&self) -> &WriteBatch {
        &self.inner
    }

    pub fn into_native(self) -> WriteBatch {
        self.inner
    }

    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        doc: &GeoDocumentReference,
        data: &T,
    ) -> Result<&mut Self> {
        let data = geo_document(data, &self.location_field)?;
        self.inner.set(doc.native(), &data)?;
        Ok(self)
    }

    pub fn set_merge<T: Serialize + ?Sized>(
        &mut self,
        doc: &GeoDocumentReference,
        data: &T,
    ) -> Result<&mut Self> {
        let data = geo_fields(data, &self.location_field)?;
        self.inner.set_merge(doc.native(), &data)?;
        Ok(self)
    }

    pub fn update<T: Serialize + ?Sized>(
        &mut self,
        doc: &GeoDocumentReference,
        fields: &T,
    ) -> Result<&mut Self> {
        let fields = geo_fields(fields, &self.location_field)?;
        self.inner.update(doc.native(), &fields)?;
        Ok(self)
    }

    pub fn delete(&mut self, doc: &GeoDocumentReference) -> Result<&mut Self> {
        self.inner.delete(doc.native())?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub async fn commit(self) -> Result<CommitResult> {
        self.inner.commit().await
    }
}
