// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geographic points and location field validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::db::{to_document_data, DocumentData};
use crate::error::{DbError, Result};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        point.check()?;
        Ok(point)
    }

    /// Check that both coordinates are finite and in range.
    pub fn check(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(DbError::InvalidLocation(format!(
                "coordinates must be finite, got ({}, {})",
                self.latitude, self.longitude
            )));
        }
        self.validate()
            .map_err(|e| DbError::InvalidLocation(e.to_string()))
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

impl TryFrom<geo::Point<f64>> for GeoPoint {
    type Error = DbError;

    fn try_from(point: geo::Point<f64>) -> Result<Self> {
        GeoPoint::new(point.y(), point.x())
    }
}

/// Read and validate the location stored at `field`, if any.
pub(crate) fn location_from_data(data: &DocumentData, field: &str) -> Result<Option<GeoPoint>> {
    data.get(field).map(|value| parse_location(field, value)).transpose()
}

fn parse_location(field: &str, value: &Value) -> Result<GeoPoint> {
    let point: GeoPoint = serde_json::from_value(value.clone()).map_err(|e| {
        DbError::InvalidLocation(format!("field '{}' is not a GeoPoint: {}", field, e))
    })?;
    point.check()?;
    Ok(point)
}

/// Serialize a full geo document; the location field is required.
pub(crate) fn geo_document<T: Serialize + ?Sized>(data: &T, field: &str) -> Result<DocumentData> {
    let data = to_document_data(data)?;
    if location_from_data(&data, field)?.is_none() {
        return Err(DbError::InvalidLocation(format!(
            "document has no '{}' field",
            field
        )));
    }
    Ok(data)
}

/// Serialize a partial geo document; the location is checked only when present.
///
/// Dotted updates into the location field are rejected, the point must be
/// written as a whole.
pub(crate) fn geo_fields<T: Serialize + ?Sized>(data: &T, field: &str) -> Result<DocumentData> {
    let data = to_document_data(data)?;
    let nested_prefix = format!("{}.", field);
    if let Some(key) = data.keys().find(|k| k.starts_with(&nested_prefix)) {
        return Err(DbError::InvalidLocation(format!(
            "'{}' must be written as a whole GeoPoint",
            key
        )));
    }
    location_from_data(&data, field)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_points() {
        assert!(GeoPoint::new(37.7749, -122.4194).is_ok());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_points() {
        for (lat, lng) in [(90.1, 0.0), (-91.0, 0.0), (0.0, 180.5), (0.0, -181.0)] {
            assert!(
                matches!(GeoPoint::new(lat, lng), Err(DbError::InvalidLocation(_))),
                "({}, {}) should be rejected",
                lat,
                lng
            );
        }
    }

    #[test]
    fn test_non_finite_points() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_geo_point_conversion() {
        let point = GeoPoint::new(37.0, -122.0).unwrap();
        let geo_point: geo::Point<f64> = point.into();
        assert_eq!(geo_point.x(), -122.0);
        assert_eq!(geo_point.y(), 37.0);

        let back = GeoPoint::try_from(geo_point).unwrap();
        assert_eq!(back, point);
        assert!(GeoPoint::try_from(geo::Point::new(200.0, 0.0)).is_err());
    }

    #[test]
    fn test_geo_document_requires_location() {
        let ok = json!({"name": "SF", "coordinates": {"latitude": 37.7, "longitude": -122.4}});
        assert!(geo_document(&ok, "coordinates").is_ok());

        let missing = json!({"name": "SF"});
        assert!(matches!(
            geo_document(&missing, "coordinates"),
            Err(DbError::InvalidLocation(_))
        ));

        let malformed = json!({"coordinates": "37.7,-122.4"});
        assert!(matches!(
            geo_document(&malformed, "coordinates"),
            Err(DbError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_geo_fields_location_optional() {
        assert!(geo_fields(&json!({"name": "SF"}), "coordinates").is_ok());
        assert!(geo_fields(
            &json!({"coordinates": {"latitude": 95.0, "longitude": 0.0}}),
            "coordinates"
        )
        .is_err());
        assert!(matches!(
            geo_fields(&json!({"coordinates.latitude": 10.0}), "coordinates"),
            Err(DbError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_custom_location_field() {
        let data = json!({"pos": {"latitude": 1.0, "longitude": 2.0}});
        let doc = geo_document(&data, "pos").unwrap();
        assert_eq!(
            location_from_data(&doc, "pos").unwrap(),
            Some(GeoPoint::new(1.0, 2.0).unwrap())
        );
        assert!(geo_document(&data, "coordinates").is_err());
    }
}
