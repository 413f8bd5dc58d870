//! Scrape run error types.
//!
//! Every failure that ends a run maps onto one [`ScanError`].

use leadgrid_places::PlacesError;
use leadgrid_store::StoreError;
use thiserror::Error;

/// Errors that end a scrape run.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ScanError {
    #[error("invalid scrape request: {0}")]
    InvalidRequest(String),

    #[error("list '{list}' does not exist")]
    ListNotFound { list: String },

    #[error("could not find coordinates for '{area}'")]
    LocationNotFound { area: String },

    #[error("places provider error: {0}")]
    Provider(#[from] PlacesError),

    #[error("failed to save list: {0}")]
    Persistence(StoreError),

    #[error("list store error: {0}")]
    Store(StoreError),

    #[error("event consumer went away")]
    Cancelled,
}

impl ScanError {
    /// Classify a store error raised while loading or saving `list`.
    #[must_use]
    pub fn from_store(list: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::ListNotFound {
                list: list.to_string(),
            },
            StoreError::MissingName | StoreError::InvalidName(_) => {
                Self::InvalidRequest(err.to_string())
            }
            StoreError::Persistence { .. } => Self::Persistence(err),
            other => Self::Store(other),
        }
    }
}

/// Result type alias for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_classification() {
        let err = ScanError::from_store(
            "leads",
            StoreError::NotFound {
                list: "leads".to_string(),
            },
        );
        assert!(matches!(err, ScanError::ListNotFound { list } if list == "leads"));

        let err = ScanError::from_store("", StoreError::MissingName);
        assert!(matches!(err, ScanError::InvalidRequest(_)));

        let err = ScanError::from_store(
            "leads",
            StoreError::Persistence {
                path: "/lists/leads.json".into(),
                source: std::io::Error::other("disk full"),
            },
        );
        assert!(matches!(err, ScanError::Persistence(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::LocationNotFound {
            area: "Atlantis".to_string(),
        };
        assert_eq!(err.to_string(), "could not find coordinates for 'Atlantis'");
    }
}
