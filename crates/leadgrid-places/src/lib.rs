//! Leadgrid Places - provider gateway for geocoding and place discovery.
//!
//! The [`PlacesGateway`] trait is the seam between the scrape pipeline and
//! the remote places service. [`GoogleMapsGateway`] implements it over the
//! Google Maps JSON web services; tests substitute scripted fakes.
//!
//! # Example
//!
//! ```rust,no_run
//! use leadgrid_places::{DetailField, GoogleMapsGateway, NearbyQuery, PlacesGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GoogleMapsGateway::new("api-key")?;
//! if let Some(center) = gateway.geocode("Monza, Italy").await? {
//!     let page = gateway
//!         .search_nearby(&NearbyQuery::new(center, 750, "pizzeria"))
//!         .await?;
//!     println!("{} results", page.results.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod gateway;
pub mod providers;

// Re-export commonly used types
pub use error::{PlacesError, Result};
pub use gateway::{DetailField, NearbyPage, NearbyQuery, PlaceDetails, PlaceStub, PlacesGateway};
pub use providers::GoogleMapsGateway;
