//! Error types for CLI commands.

use leadgrid_core::ConfigError;
use leadgrid_places::PlacesError;
use leadgrid_store::StoreError;
use serde::Serialize;
use std::fmt;

/// Stable error codes reported to callers.
pub mod codes {
    /// Missing list, row or location
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// List already exists
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    /// Rejected input
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    /// Places provider failure
    pub const PROVIDER_UNAVAILABLE: &str = "PROVIDER_UNAVAILABLE";
    /// A list could not be written
    pub const PERSISTENCE_FAILURE: &str = "PERSISTENCE_FAILURE";
    /// Anything else
    pub const INTERNAL: &str = "INTERNAL";
}

/// Serializable error for command results.
#[derive(Debug, Serialize)]
pub struct CommandError {
    /// Error code for callers (e.g., "NOT_FOUND")
    pub code: String,
    /// User-friendly error message
    pub message: String,
    /// Optional debugging context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound { list } => Self::with_details(
                codes::NOT_FOUND,
                message,
                serde_json::json!({ "list": list }),
            ),
            StoreError::RowNotFound { list, place_id } => Self::with_details(
                codes::NOT_FOUND,
                message,
                serde_json::json!({ "list": list, "place_id": place_id }),
            ),
            StoreError::AlreadyExists { list } => Self::with_details(
                codes::ALREADY_EXISTS,
                message,
                serde_json::json!({ "list": list }),
            ),
            StoreError::MissingName
            | StoreError::InvalidName(_)
            | StoreError::InvalidField { .. }
            | StoreError::InvalidValue { .. } => Self::new(codes::INVALID_INPUT, message),
            StoreError::Persistence { path, .. } => Self::with_details(
                codes::PERSISTENCE_FAILURE,
                message,
                serde_json::json!({ "path": path.display().to_string() }),
            ),
            StoreError::Corrupt { .. } | StoreError::Serialization(_) | StoreError::Io(_) => {
                Self::new(codes::INTERNAL, message)
            }
        }
    }
}

impl From<PlacesError> for CommandError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::InvalidRequest(msg) => Self::new(codes::INVALID_INPUT, msg),
            PlacesError::Internal(msg) => Self::new(codes::INTERNAL, msg),
            other => Self::new(codes::PROVIDER_UNAVAILABLE, other.to_string()),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { .. } => Self::new(codes::INVALID_INPUT, err.to_string()),
            other => Self::new(codes::INTERNAL, other.to_string()),
        }
    }
}

/// Convert `std::io::Error` to `CommandError`.
impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::new(codes::INTERNAL, format!("I/O error: {err}"))
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(codes::INTERNAL, format!("Serialization error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_new() {
        let err = CommandError::new("TEST_CODE", "Test message");
        assert_eq!(err.code, "TEST_CODE");
        assert_eq!(err.message, "Test message");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_store_not_found_conversion() {
        let err: CommandError = StoreError::NotFound {
            list: "leads".to_string(),
        }
        .into();
        assert_eq!(err.code, codes::NOT_FOUND);
        assert_eq!(err.details, Some(serde_json::json!({ "list": "leads" })));
    }

    #[test]
    fn test_store_input_errors() {
        let err: CommandError = StoreError::MissingName.into();
        assert_eq!(err.code, codes::INVALID_INPUT);

        let err: CommandError = StoreError::InvalidField {
            field: "color".to_string(),
        }
        .into();
        assert_eq!(err.code, codes::INVALID_INPUT);
    }

    #[test]
    fn test_store_conflict_and_persistence() {
        let err: CommandError = StoreError::AlreadyExists {
            list: "leads".to_string(),
        }
        .into();
        assert_eq!(err.code, codes::ALREADY_EXISTS);

        let err: CommandError = StoreError::Persistence {
            path: "/lists/leads.json".into(),
            source: std::io::Error::other("disk full"),
        }
        .into();
        assert_eq!(err.code, codes::PERSISTENCE_FAILURE);
        assert!(err.details.is_some());
    }

    #[test]
    fn test_missing_api_key_is_provider_unavailable() {
        let err: CommandError = PlacesError::MissingApiKey {
            provider: "google-maps".to_string(),
            env: "GOOGLE_MAPS_API_KEY",
        }
        .into();
        assert_eq!(err.code, codes::PROVIDER_UNAVAILABLE);
        assert!(err.message.contains("GOOGLE_MAPS_API_KEY"));
    }

    #[test]
    fn test_error_serialization() {
        let err = CommandError::new("TEST_CODE", "Test message");
        let json = serde_json::to_string(&err).expect("serialize error");
        assert_eq!(json, r#"{"code":"TEST_CODE","message":"Test message"}"#);
    }
}
