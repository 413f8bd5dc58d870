//! Error types for the places gateway.

use thiserror::Error;

/// Errors that can occur while talking to a places provider.
#[derive(Error, Debug)]
pub enum PlacesError {
    /// No API key configured for a provider that needs one
    #[error("no API key configured for {provider} (set {env})")]
    MissingApiKey {
        /// Provider name
        provider: String,
        /// Environment variable that supplies the key
        env: &'static str,
    },

    /// Details were requested for a place the provider no longer knows
    #[error("place not found: {place_id}")]
    PlaceNotFound {
        /// Provider place identifier
        place_id: String,
    },

    /// Quota or rate limit exceeded
    #[error("rate limit exceeded for {provider}: {message}")]
    RateLimitExceeded {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Invalid API key or request denied
    #[error("authentication failed for {provider}: {message}")]
    AuthenticationFailed {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The provider answered with a non-success status field
    #[error("{provider} returned status {status}: {message}")]
    ApiStatus {
        /// Provider name
        provider: String,
        /// Status string from the response body
        status: String,
        /// Error message
        message: String,
    },

    /// HTTP error status
    #[error("API error ({provider}): status {status}, {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Request validation error
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response parsing error
    #[error("failed to parse response from {provider}: {message}")]
    ParseError {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlacesError {
    /// Whether this error concerns a single place rather than the provider.
    #[must_use]
    pub fn is_place_scoped(&self) -> bool {
        matches!(self, Self::PlaceNotFound { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, PlacesError>;
