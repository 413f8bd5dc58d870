//! Command-line interface.

use crate::commands;
use crate::error::CommandError;
use crate::state::AppState;
use clap::{Parser, Subcommand, ValueEnum};
use leadgrid_scanner::ScrapeRequest;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "leadgrid")]
#[command(about = "Sweep an area with nearby searches and collect businesses into editable lists")]
#[command(version)]
pub struct Cli {
    /// Directory holding list documents (or use LEADGRID_LISTS_DIR env var)
    #[arg(long, global = true)]
    pub lists_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the names of all lists
    Lists,
    /// Create an empty list
    Create {
        /// List name, with or without the .json extension
        name: String,
    },
    /// Print every record in a list
    Show {
        /// List name
        name: String,
    },
    /// Delete a list
    Delete {
        /// List name
        name: String,
    },
    /// Set or clear a flag on a row
    Mark {
        /// List name
        name: String,
        /// Place id of the row
        place_id: String,
        /// Flag to change
        #[arg(value_enum)]
        action: RowAction,
        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },
    /// Replace the note on a row
    Note {
        /// List name
        name: String,
        /// Place id of the row
        place_id: String,
        /// New note text (empty clears it)
        note: String,
    },
    /// Print the search history of a list
    Searches {
        /// List name
        name: String,
    },
    /// Sweep an area and append new places to a list, streaming NDJSON events
    Scrape {
        /// Area to search, e.g. "Monza, Italy"
        #[arg(long)]
        area: String,
        /// Radius around the area center, in meters
        #[arg(long)]
        radius: u32,
        /// Search keywords (repeat or separate with commas)
        #[arg(short, long = "keyword", value_delimiter = ',', required = true)]
        keywords: Vec<String>,
        /// Target list
        #[arg(long)]
        list: String,
        /// Grid spacing in meters (defaults to the configured step)
        #[arg(long)]
        grid_step: Option<u32>,
    },
}

/// Row flags that can be toggled from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RowAction {
    /// Hide the row from the default view
    Hide,
    /// Mark the business as contacted
    Call,
    /// Mark the business as a promising lead
    Interested,
}

impl RowAction {
    /// Action name understood by the store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Call => "call",
            Self::Interested => "interested",
        }
    }
}

#[derive(Serialize)]
struct Ack<'a> {
    ok: bool,
    list: &'a str,
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), CommandError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Run one command, writing its JSON output to `out`.
///
/// Returns `false` when a scrape run ended with an error event.
pub async fn execute<W: Write>(
    state: &AppState,
    command: Command,
    out: &mut W,
) -> Result<bool, CommandError> {
    match command {
        Command::Lists => print_json(out, &commands::get_lists(state).await?)?,
        Command::Create { name } => {
            let file_name = commands::create_list(state, &name).await?;
            print_json(out, &Ack { ok: true, list: &file_name })?;
        }
        Command::Show { name } => print_json(out, &commands::get_list_content(state, &name).await?)?,
        Command::Delete { name } => {
            commands::delete_list(state, &name).await?;
            print_json(out, &Ack { ok: true, list: &name })?;
        }
        Command::Mark {
            name,
            place_id,
            action,
            off,
        } => {
            commands::update_row(state, &name, &place_id, action.as_str(), !off).await?;
            print_json(out, &Ack { ok: true, list: &name })?;
        }
        Command::Note {
            name,
            place_id,
            note,
        } => {
            commands::update_note(state, &name, &place_id, &note).await?;
            print_json(out, &Ack { ok: true, list: &name })?;
        }
        Command::Searches { name } => {
            print_json(out, &commands::get_searches(state, &name).await?)?;
        }
        Command::Scrape {
            area,
            radius,
            keywords,
            list,
            grid_step,
        } => {
            let mut request = ScrapeRequest::new(area, radius, keywords, list);
            request.grid_step_m = grid_step;
            let events = commands::start_scrape(state, request)?;
            return commands::relay_events(events, out).await;
        }
    }
    Ok(true)
}
