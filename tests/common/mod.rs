// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::time::Duration;

use geofirestore::{Firestore, GeoFirestore, GeoPoint, TransactionOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// City document used across the integration tests.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub coordinates: GeoPoint,
    #[serde(default)]
    pub visits: u64,
}

/// Create a fresh, empty database wrapped in the geo facade.
#[allow(dead_code)]
pub fn test_geo() -> GeoFirestore {
    let firestore = Firestore::new("test-project").expect("Failed to open test database");
    GeoFirestore::new(firestore)
}

/// Geo document JSON for a city.
#[allow(dead_code)]
pub fn city(name: &str, latitude: f64, longitude: f64) -> Value {
    json!({
        "name": name,
        "coordinates": { "latitude": latitude, "longitude": longitude },
        "visits": 0,
    })
}

/// Transaction options without retry delays.
#[allow(dead_code)]
pub fn fast_options(max_attempts: u32) -> TransactionOptions {
    TransactionOptions::new()
        .with_max_attempts(max_attempts)
        .expect("max_attempts must be positive")
        .with_backoff(Duration::ZERO, Duration::ZERO)
}
