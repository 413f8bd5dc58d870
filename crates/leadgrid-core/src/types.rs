//! Shared types used across the Leadgrid workspace.
//!
//! This module defines common newtypes that provide type safety
//! and clear domain modeling.

use crate::error::LeadgridError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Approximate length of one degree of latitude, in meters.
///
/// One degree of longitude is this value scaled by `cos(latitude)`.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// File extension shared by every persisted list document.
pub const LIST_EXTENSION: &str = "json";

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// # Errors
    /// Returns error if latitude is outside [-90, 90], longitude is outside
    /// [-180, 180], or either value is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LeadgridError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LeadgridError::Validation(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LeadgridError::Validation(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from computed coordinates, clamping latitude and
    /// wrapping longitude back into range.
    #[must_use]
    pub fn normalized(latitude: f64, longitude: f64) -> Self {
        let latitude = latitude.clamp(-90.0, 90.0);
        let longitude = if (-180.0..=180.0).contains(&longitude) {
            longitude
        } else {
            (longitude + 180.0).rem_euclid(360.0) - 180.0
        };
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Offset of this point from `origin` in local meters, as `(east, north)`.
    ///
    /// Flat-earth approximation; the longitude scale uses this point's latitude.
    #[must_use]
    pub fn planar_offset_m(&self, origin: &GeoPoint) -> (f64, f64) {
        let north = (self.latitude - origin.latitude) * METERS_PER_DEGREE;
        let mut delta_lng = self.longitude - origin.longitude;
        if delta_lng > 180.0 {
            delta_lng -= 360.0;
        } else if delta_lng < -180.0 {
            delta_lng += 360.0;
        }
        let east = delta_lng * METERS_PER_DEGREE * self.latitude.to_radians().cos();
        (east, north)
    }

    /// Planar distance from `origin` in meters.
    #[must_use]
    pub fn planar_distance_m(&self, origin: &GeoPoint) -> f64 {
        let (east, north) = self.planar_offset_m(origin);
        east.hypot(north)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Provider-assigned place identifier, the natural key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Create a new `PlaceId`.
    ///
    /// # Errors
    /// Returns error if the identifier is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, LeadgridError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LeadgridError::Validation(
                "place ID must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of a persisted list.
///
/// Accepted with or without the `.json` extension; the stored form never
/// carries it. Names are restricted to letters, digits, spaces, `_`, `-` and
/// `.` so they are always safe as a single file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListName(String);

impl ListName {
    /// Create a new `ListName`.
    ///
    /// # Errors
    /// Returns error if the name is empty or not filesystem-safe.
    pub fn new(name: impl AsRef<str>) -> Result<Self, LeadgridError> {
        let trimmed = name.as_ref().trim();
        let stem = trimmed
            .strip_suffix(&format!(".{LIST_EXTENSION}"))
            .unwrap_or(trimmed);
        Self::validate(stem)?;
        Ok(Self(stem.to_string()))
    }

    /// Get the name without extension.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the backing document (`<name>.json`).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{LIST_EXTENSION}", self.0)
    }

    fn validate(stem: &str) -> Result<(), LeadgridError> {
        static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = NAME_REGEX.get_or_init(|| {
            Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} _.\-]{0,127}$").expect("valid regex")
        });

        if stem.is_empty() {
            return Err(LeadgridError::Validation(
                "list name must not be empty".to_string(),
            ));
        }

        if stem.contains("..") || !regex.is_match(stem) {
            return Err(LeadgridError::Validation(format!(
                "invalid list name: must be 1-128 letters, digits, spaces, '_', '-' or '.', got '{stem}'"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, LeadgridError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| LeadgridError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_valid() {
        let point = GeoPoint::new(45.4642, 9.19).expect("valid point");
        assert!((point.latitude() - 45.4642).abs() < f64::EPSILON);
        assert!((point.longitude() - 9.19).abs() < f64::EPSILON);
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_geo_point_invalid() {
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(-91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.1).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_geo_point_normalized_wraps_longitude() {
        let point = GeoPoint::normalized(95.0, 181.0);
        assert!((point.latitude() - 90.0).abs() < f64::EPSILON);
        assert!((point.longitude() + 179.0).abs() < 1e-9);

        let point = GeoPoint::normalized(10.0, -190.0);
        assert!((point.longitude() - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_planar_offset() {
        let origin = GeoPoint::new(0.0, 0.0).expect("origin");
        let north = GeoPoint::new(1.0, 0.0).expect("north");
        let (east_m, north_m) = north.planar_offset_m(&origin);
        assert!(east_m.abs() < 1e-9);
        assert!((north_m - METERS_PER_DEGREE).abs() < 1e-6);

        let east = GeoPoint::new(0.0, 1.0).expect("east");
        assert!((east.planar_distance_m(&origin) - METERS_PER_DEGREE).abs() < 1e-6);
    }

    #[test]
    fn test_planar_offset_across_antimeridian() {
        let origin = GeoPoint::new(0.0, 179.999).expect("origin");
        let other = GeoPoint::new(0.0, -179.999).expect("other");
        assert!(other.planar_distance_m(&origin) < 300.0);
    }

    #[test]
    fn test_place_id() {
        let id = PlaceId::new("ChIJN1t_tDeuEmsRUsoyG83frY4").expect("valid place id");
        assert_eq!(id.as_str(), "ChIJN1t_tDeuEmsRUsoyG83frY4");
        assert!(PlaceId::new("").is_err());
        assert!(PlaceId::new("   ").is_err());

        let json = serde_json::to_string(&id).expect("serialize place id");
        assert_eq!(json, "\"ChIJN1t_tDeuEmsRUsoyG83frY4\"");
    }

    #[test]
    fn test_list_name_valid() {
        let valid = vec!["leads", "Ristoranti Milano", "bar_2024", "v1.2-draft", "caffè"];
        for name in valid {
            assert!(ListName::new(name).is_ok(), "Failed for: {name}");
        }
    }

    #[test]
    fn test_list_name_strips_extension() {
        let name = ListName::new("leads.json").expect("valid name");
        assert_eq!(name.as_str(), "leads");
        assert_eq!(name.file_name(), "leads.json");
        assert_eq!(name, ListName::new("leads").expect("valid name"));
    }

    #[test]
    fn test_list_name_invalid() {
        let too_long = "a".repeat(129);
        let invalid = vec![
            "",
            ".json",
            "../etc/passwd",
            "a/b",
            "a\\b",
            ".hidden",
            "bad..name",
            too_long.as_str(),
        ];
        for name in invalid {
            assert!(ListName::new(name).is_err(), "Should fail for: {name}");
        }
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::now();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::from_rfc3339(&s).expect("parse RFC3339 timestamp");
        assert_eq!(ts.timestamp(), parsed.timestamp());
        assert!(Timestamp::from_rfc3339("yesterday").is_err());
    }
}
