//! Leadgrid Scanner - grid-based place discovery.
//!
//! This crate turns a free-text area, a radius and a set of keywords into
//! new records appended to a list. It plans a search grid, sweeps it through
//! a [`leadgrid_places::PlacesGateway`], deduplicates against the list and
//! within the run, fetches details and persists the result through
//! [`leadgrid_store::TabularStore`].
//!
//! # Features
//!
//! - Circular grid coverage with overlapping query circles
//! - Paginated nearby search with a per-point page cap
//! - Deduplication against stored and already-seen place ids
//! - Streaming progress events with backpressure
//! - Search history appended to the list on every successful run
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use leadgrid_scanner::{ScrapePipeline, ScrapeRequest};
//!
//! let pipeline = ScrapePipeline::new(gateway, store);
//! let mut events = pipeline.run(ScrapeRequest::new(
//!     "Monza, Italy",
//!     3000,
//!     vec!["pizzeria".to_string()],
//!     "monza-food",
//! ));
//! while let Some(event) = events.next().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod events;
pub mod grid;
pub mod ledger;
pub mod pipeline;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use events::{EventStream, ProgressKind, ScrapeEvent};
pub use grid::{plan, plan_with_factor, SearchGrid};
pub use ledger::{Admission, DeduplicationLedger};
pub use pipeline::{ScrapePipeline, ScrapeRequest, ScrapeSettings};
