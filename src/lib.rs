// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GeoFirestore: geo-aware documents on top of a document database.
//!
//! [`GeoFirestore`] wraps a [`Firestore`] handle and forwards collection
//! access, write batches and optimistic transactions to it, returning
//! wrappers that keep a validated [`GeoPoint`] on every document.

pub mod config;
pub mod db;
pub mod error;
pub mod geo;

pub use crate::db::{Firestore, Transaction, TransactionOptions};
pub use crate::error::{DbError, TransactionError};
pub use crate::geo::{GeoFirestore, GeoPoint, GeoTransaction};
