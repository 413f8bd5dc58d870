//! Google Maps web services provider.

use super::common::{build_http_client, read_json};
use crate::error::{PlacesError, Result};
use crate::gateway::{DetailField, NearbyPage, NearbyQuery, PlaceDetails, PlaceStub, PlacesGateway};
use async_trait::async_trait;
use leadgrid_core::config::API_KEY_ENV;
use leadgrid_core::{GeoPoint, PlaceId, ProviderConfig};
use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::{debug, warn};

const PROVIDER_ID: &str = "google-maps";
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Gateway backed by the Geocoding, Nearby Search and Place Details
/// JSON endpoints.
pub struct GoogleMapsGateway {
    client: Client,
    base_url: String,
    api_key: String,
    language: Option<String>,
}

impl GoogleMapsGateway {
    /// Create a gateway against the public endpoints.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a gateway against a custom base URL.
    pub fn with_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Self::missing_key());
        }

        Ok(Self {
            client: build_http_client(None)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            language: None,
        })
    }

    /// Create a gateway from the `[provider]` config section.
    ///
    /// Fails with `MissingApiKey` when no key was supplied.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(Self::missing_key)?;

        Ok(Self {
            client: build_http_client(Some(config.timeout_secs))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: config.language.clone(),
        })
    }

    /// Request results in `language` (e.g. "it").
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn missing_key() -> PlacesError {
        PlacesError::MissingApiKey {
            provider: PROVIDER_ID.to_string(),
            env: API_KEY_ENV,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}/json", self.base_url)
    }

    fn build(&self, path: &str, mut params: Vec<(&str, String)>) -> Result<Request> {
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params.push(("key", self.api_key.clone()));

        self.client
            .get(self.endpoint(path))
            .query(&params)
            .build()
            .map_err(|e| PlacesError::InvalidRequest(format!("failed to build request: {e}")))
    }

    fn geocode_request(&self, query: &str) -> Result<Request> {
        self.build("geocode", vec![("address", query.to_string())])
    }

    fn nearby_request(&self, query: &NearbyQuery) -> Result<Request> {
        // A continuation request carries only the token.
        let params = match &query.page_token {
            Some(token) => vec![("pagetoken", token.clone())],
            None => vec![
                ("location", query.location.to_string()),
                ("radius", query.radius_m.to_string()),
                ("keyword", query.keyword.clone()),
            ],
        };
        self.build("place/nearbysearch", params)
    }

    fn details_request(&self, place_id: &PlaceId, fields: &[DetailField]) -> Result<Request> {
        let mut params = vec![("place_id", place_id.to_string())];
        if !fields.is_empty() {
            params.push(("fields", DetailField::join(fields)));
        }
        self.build("place/details", params)
    }

    async fn execute<T: serde::de::DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.client.execute(request).await?;
        read_json(PROVIDER_ID, response).await
    }
}

/// Map a response `status` field onto an error, `None` meaning success.
fn status_error(status: &str, message: Option<String>) -> Option<PlacesError> {
    let message = message.unwrap_or_default();
    match status {
        "OK" | "ZERO_RESULTS" => None,
        "OVER_QUERY_LIMIT" => Some(PlacesError::RateLimitExceeded {
            provider: PROVIDER_ID.to_string(),
            message,
        }),
        "REQUEST_DENIED" => Some(PlacesError::AuthenticationFailed {
            provider: PROVIDER_ID.to_string(),
            message,
        }),
        other => Some(PlacesError::ApiStatus {
            provider: PROVIDER_ID.to_string(),
            status: other.to_string(),
            message,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceStub>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

impl GeocodeResponse {
    fn into_point(self) -> Result<Option<GeoPoint>> {
        if let Some(err) = status_error(&self.status, self.error_message) {
            return Err(err);
        }
        let Some(first) = self.results.into_iter().next() else {
            return Ok(None);
        };
        let LatLng { lat, lng } = first.geometry.location;
        GeoPoint::new(lat, lng)
            .map(Some)
            .map_err(|e| PlacesError::ParseError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }
}

impl NearbyResponse {
    fn into_page(self) -> Result<NearbyPage> {
        if let Some(err) = status_error(&self.status, self.error_message) {
            return Err(err);
        }
        Ok(NearbyPage {
            results: self.results,
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

impl DetailsResponse {
    fn into_details(self, place_id: &PlaceId) -> Result<PlaceDetails> {
        if self.status == "NOT_FOUND" {
            return Err(PlacesError::PlaceNotFound {
                place_id: place_id.to_string(),
            });
        }
        if let Some(err) = status_error(&self.status, self.error_message) {
            return Err(err);
        }
        self.result.ok_or_else(|| PlacesError::ParseError {
            provider: PROVIDER_ID.to_string(),
            message: format!("details for {place_id} carried no result"),
        })
    }
}

#[async_trait]
impl PlacesGateway for GoogleMapsGateway {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        let request = self.geocode_request(query)?;
        let response: GeocodeResponse = self.execute(request).await?;
        let point = response.into_point()?;
        if point.is_none() {
            warn!(query, "geocoding returned no match");
        }
        Ok(point)
    }

    async fn search_nearby(&self, query: &NearbyQuery) -> Result<NearbyPage> {
        let request = self.nearby_request(query)?;
        let response: NearbyResponse = self.execute(request).await?;
        let page = response.into_page()?;
        debug!(
            location = %query.location,
            keyword = %query.keyword,
            continued = query.page_token.is_some(),
            results = page.results.len(),
            "nearby page fetched"
        );
        Ok(page)
    }

    async fn place_details(
        &self,
        place_id: &PlaceId,
        fields: &[DetailField],
    ) -> Result<PlaceDetails> {
        let request = self.details_request(place_id, fields)?;
        let response: DetailsResponse = self.execute(request).await?;
        response.into_details(place_id)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}
