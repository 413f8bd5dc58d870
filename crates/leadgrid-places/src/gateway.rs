//! Places gateway trait and request/response types.

use crate::error::Result;
use async_trait::async_trait;
use leadgrid_core::{GeoPoint, PlaceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for places providers supporting geocoding, nearby search and
/// detail lookups.
///
/// Implementations must be thread-safe (Send + Sync) so a single gateway
/// can be shared by concurrent scrape runs.
#[async_trait]
pub trait PlacesGateway: Send + Sync {
    /// Resolve a free-text area to a coordinate.
    ///
    /// Returns `Ok(None)` when the provider has no match for `query`.
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>>;

    /// Fetch one page of nearby results.
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<NearbyPage>;

    /// Fetch the requested attributes of a single place.
    async fn place_details(&self, place_id: &PlaceId, fields: &[DetailField])
        -> Result<PlaceDetails>;

    /// Get the unique identifier for this provider.
    fn provider_id(&self) -> &str;
}

/// A nearby search around one point for one keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    /// Search center
    pub location: GeoPoint,
    /// Search radius in meters
    pub radius_m: u32,
    /// Free-text keyword
    pub keyword: String,
    /// Continuation token from the previous page
    pub page_token: Option<String>,
}

impl NearbyQuery {
    /// First-page query.
    #[must_use]
    pub fn new(location: GeoPoint, radius_m: u32, keyword: impl Into<String>) -> Self {
        Self {
            location,
            radius_m,
            keyword: keyword.into(),
            page_token: None,
        }
    }

    /// The same query continued from `token`.
    #[must_use]
    pub fn next_page(&self, token: impl Into<String>) -> Self {
        Self {
            page_token: Some(token.into()),
            ..self.clone()
        }
    }
}

/// One page of nearby results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    /// Candidates on this page
    pub results: Vec<PlaceStub>,
    /// Token for the next page, if the provider has more
    pub next_page_token: Option<String>,
}

/// A lightweight search result.
///
/// Providers occasionally return entries without an id; those carry
/// `place_id: None` and are skipped downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceStub {
    /// Provider place identifier
    #[serde(default)]
    pub place_id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

impl PlaceStub {
    /// Stub with both id and name.
    #[must_use]
    pub fn new(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            name: Some(name.into()),
        }
    }
}

/// Detail attributes as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceDetails {
    /// Display name
    pub name: Option<String>,
    /// Formatted address
    pub formatted_address: Option<String>,
    /// Formatted phone number
    pub formatted_phone_number: Option<String>,
    /// Website URL
    pub website: Option<String>,
    /// Average user rating
    pub rating: Option<f64>,
    /// Provider place types
    pub types: Vec<String>,
}

/// Attributes that can be requested from a details lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    /// Display name
    Name,
    /// Formatted address
    FormattedAddress,
    /// Formatted phone number
    FormattedPhoneNumber,
    /// Website URL
    Website,
    /// Average rating
    Rating,
    /// Place types
    Types,
}

impl DetailField {
    /// The field set needed to build a stored record.
    pub const RECORD: [DetailField; 6] = [
        DetailField::Name,
        DetailField::FormattedAddress,
        DetailField::FormattedPhoneNumber,
        DetailField::Website,
        DetailField::Rating,
        DetailField::Types,
    ];

    /// Field name on the wire.
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FormattedAddress => "formatted_address",
            Self::FormattedPhoneNumber => "formatted_phone_number",
            Self::Website => "website",
            Self::Rating => "rating",
            Self::Types => "types",
        }
    }

    /// Comma-separated wire names, e.g. `name,website`.
    #[must_use]
    pub fn join(fields: &[DetailField]) -> String {
        fields
            .iter()
            .map(|f| f.api_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}
