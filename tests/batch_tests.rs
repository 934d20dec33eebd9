// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geo write batches.

use geofirestore::DbError;
use serde_json::json;

mod common;
use common::{city, test_geo};

#[tokio::test]
async fn test_batch_commits_all_writes() {
    let geo = test_geo();
    let cities = geo.collection("cities").unwrap();
    let sf = cities.doc("sf").unwrap();
    let la = cities.doc("la").unwrap();
    let old = cities.doc("old").unwrap();
    old.set(&city("Old Town", 10.0, 10.0)).await.unwrap();

    let mut batch = geo.batch();
    batch
        .set(&sf, &city("San Francisco", 37.77, -122.42))
        .unwrap()
        .set(&la, &city("Los Angeles", 34.05, -118.24))
        .unwrap()
        .delete(&old)
        .unwrap();
    assert_eq!(batch.len(), 3);

    let result = batch.commit().await.unwrap();
    assert_eq!(result.write_count, 3);

    assert!(sf.get().await.unwrap().exists());
    assert!(la.get().await.unwrap().exists());
    assert!(!old.get().await.unwrap().exists());
}

#[tokio::test]
async fn test_invalid_location_is_rejected_when_queued() {
    let geo = test_geo();
    let doc = geo.doc("cities/bad").unwrap();
    let mut batch = geo.batch();

    let err = batch
        .set(&doc, &json!({ "coordinates": { "latitude": 91.0, "longitude": 0.0 } }))
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidLocation(_)));

    let err = batch
        .update(&doc, &json!({ "coordinates": "here" }))
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidLocation(_)));

    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_failed_write_discards_whole_batch() {
    let geo = test_geo();
    let sf = geo.doc("cities/sf").unwrap();
    let missing = geo.doc("cities/missing").unwrap();

    let mut batch = geo.batch();
    batch.set(&sf, &city("San Francisco", 37.77, -122.42)).unwrap();
    batch.update(&missing, &json!({ "visits": 1 })).unwrap();

    let err = batch.commit().await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    assert!(!sf.get().await.unwrap().exists());
    assert!(!missing.get().await.unwrap().exists());
    assert_eq!(geo.firestore().document_count().await, 0);
}

#[tokio::test]
async fn test_later_writes_see_earlier_ones() {
    let geo = test_geo();
    let doc = geo.doc("cities/sf").unwrap();

    let mut batch = geo.batch();
    batch.set(&doc, &city("San Francisco", 37.77, -122.42)).unwrap();
    batch.update(&doc, &json!({ "visits": 7 })).unwrap();
    batch
        .set_merge(&doc, &json!({ "coordinates": { "latitude": 37.8, "longitude": -122.4 } }))
        .unwrap();
    batch.commit().await.unwrap();

    let snapshot = doc.get().await.unwrap();
    assert_eq!(snapshot.native().get("visits"), Some(&json!(7)));
    assert_eq!(snapshot.native().get("coordinates.latitude"), Some(&json!(37.8)));
    assert_eq!(snapshot.native().get("name"), Some(&json!("San Francisco")));
}

#[tokio::test]
async fn test_into_native_keeps_queued_writes() {
    let geo = test_geo();
    let doc = geo.doc("cities/sf").unwrap();

    let mut batch = geo.batch();
    batch.set(&doc, &city("San Francisco", 37.77, -122.42)).unwrap();

    let mut native = batch.into_native();
    native
        .set_merge(doc.native(), &json!({ "population": 808_437 }))
        .unwrap();
    native.commit().await.unwrap();

    let snapshot = doc.get().await.unwrap();
    assert_eq!(snapshot.native().get("population"), Some(&json!(808_437)));
    assert!(snapshot.location().unwrap().is_some());
}
