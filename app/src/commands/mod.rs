//! Command handlers.
//!
//! Each handler takes the shared [`crate::state::AppState`] and returns a
//! serializable value or a [`crate::error::CommandError`].

pub mod lists;
pub mod scrape;

pub use lists::{
    create_list, delete_list, get_list_content, get_lists, get_searches, update_note, update_row,
};
pub use scrape::{relay_events, start_scrape};
