//! Common utilities shared across places providers.

use crate::error::{PlacesError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build a standard HTTP client with common timeout settings.
///
/// # Arguments
/// * `timeout_secs` - Timeout in seconds (defaults to 30 if not specified)
pub fn build_http_client(timeout_secs: Option<u64>) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.unwrap_or(30)))
        .build()
        .map_err(|e| PlacesError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Reject non-2xx responses, then decode the JSON body.
pub async fn read_json<T: DeserializeOwned>(provider: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(PlacesError::ApiError {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: error_text,
        });
    }

    response.json().await.map_err(|e| PlacesError::ParseError {
        provider: provider.to_string(),
        message: format!("Failed to parse response: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Some(5)).is_ok());
    }

    #[test]
    fn test_build_http_client_default() {
        assert!(build_http_client(None).is_ok());
    }
}
