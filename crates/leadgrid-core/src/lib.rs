//! Leadgrid Core - Foundation crate for the Leadgrid lead-discovery workspace.
//!
//! This crate provides the shared types, error handling and configuration
//! management that the store, provider gateway and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes (`GeoPoint`, `PlaceId`, `ListName`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use leadgrid_core::{AppConfig, GeoPoint, ListName};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scraping.grid_step_m, 500);
//!
//! let center = GeoPoint::new(45.4642, 9.19)?;
//! let list = ListName::new("milan-restaurants")?;
//! assert_eq!(list.file_name(), "milan-restaurants.json");
//! # let _ = center;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, ProviderConfig, ScrapingConfig, StorageConfig, MIN_PAGE_TOKEN_DELAY_MS,
};
pub use error::{ConfigError, ConfigResult, LeadgridError, Result};
pub use types::{GeoPoint, ListName, PlaceId, Timestamp, LIST_EXTENSION, METERS_PER_DEGREE};
