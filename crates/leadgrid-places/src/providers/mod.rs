//! Places provider implementations.

pub mod common;
pub mod google;

pub use google::GoogleMapsGateway;
