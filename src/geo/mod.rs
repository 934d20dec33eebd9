// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geo layer: wrappers that keep a validated location on every document.

pub mod batch;
pub mod collection;
pub mod firestore;
pub mod point;
pub mod transaction;

pub use batch::GeoWriteBatch;
pub use collection::{
    GeoCollectionReference, GeoDocumentReference, GeoDocumentSnapshot, GeoQuerySnapshot,
};
pub use firestore::{GeoFirestore, DEFAULT_LOCATION_FIELD};
pub use point::GeoPoint;
pub use transaction::GeoTransaction;
