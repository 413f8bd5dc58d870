//! List management commands.

use crate::error::CommandError;
use crate::state::AppState;
use leadgrid_store::{Record, RowEdit, SearchLogEntry};
use serde_json::Value;
use tracing::info;

/// File names of every list, sorted.
pub async fn get_lists(state: &AppState) -> Result<Vec<String>, CommandError> {
    Ok(state.store.list().await?)
}

/// Create an empty list, returning its file name.
pub async fn create_list(state: &AppState, name: &str) -> Result<String, CommandError> {
    let list = state.store.create(name).await?;
    info!("Created list {}", list);
    Ok(list.file_name())
}

/// Every record in a list.
pub async fn get_list_content(state: &AppState, name: &str) -> Result<Vec<Record>, CommandError> {
    Ok(state.store.read_all(name).await?)
}

/// Delete a list and its search history.
pub async fn delete_list(state: &AppState, name: &str) -> Result<(), CommandError> {
    state.store.delete(name).await?;
    info!("Deleted list {}", name);
    Ok(())
}

/// Set or clear a flag on one row.
///
/// `action` is `hide`, `call` or `interested` (the field names `hidden`
/// and `called` are accepted too).
pub async fn update_row(
    state: &AppState,
    name: &str,
    place_id: &str,
    action: &str,
    value: bool,
) -> Result<(), CommandError> {
    let edit = RowEdit::parse(action, &Value::Bool(value))?;
    state.store.update_field(name, place_id, edit).await?;
    Ok(())
}

/// Replace the note on one row.
pub async fn update_note(
    state: &AppState,
    name: &str,
    place_id: &str,
    note: &str,
) -> Result<(), CommandError> {
    state
        .store
        .update_field(name, place_id, RowEdit::Note(note.to_string()))
        .await?;
    Ok(())
}

/// Search history of a list, oldest first.
pub async fn get_searches(
    state: &AppState,
    name: &str,
) -> Result<Vec<SearchLogEntry>, CommandError> {
    Ok(state.store.read_search_log(name).await?)
}
