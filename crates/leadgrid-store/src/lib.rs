//! Leadgrid Store - durable per-list record storage.
//!
//! Each named list is one JSON document holding the primary record table
//! and an optional search log. The store is shared by concurrent scrape runs
//! and row-edit requests.
//!
//! # Architecture
//!
//! - **Locking**: every mutation holds a per-document lock from
//!   [`LockManager`] for one read-modify-write cycle
//! - **Atomic writes**: documents are written to a temp sibling, fsynced,
//!   then renamed into place
//! - **Log preservation**: rewrites of the record table reattach the search log
//! - **Schema evolution**: fields added in later versions default on read
//!
//! # Example
//!
//! ```ignore
//! use leadgrid_store::{RowEdit, TabularStore};
//!
//! let store = TabularStore::open("/var/lib/leadgrid/lists").await?;
//! store.create("milan-bars").await?;
//! store.update_field("milan-bars", "ChIJ...", RowEdit::Called(true)).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod document;
pub mod error;
pub mod locks;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use locks::{LockManager, ResourceGuard};
pub use schema::{ListDocument, Record, RecordField, RowEdit, SearchLogEntry, SCHEMA_VERSION};
pub use store::{AppendOutcome, TabularStore};
