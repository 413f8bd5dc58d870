//! Scrape command: runs the pipeline and relays its events as NDJSON.

use crate::error::CommandError;
use crate::state::AppState;
use futures::StreamExt;
use leadgrid_scanner::{EventStream, ScrapeEvent, ScrapeRequest};
use std::io::Write;

/// Start a scrape run and return its event stream.
pub fn start_scrape(state: &AppState, request: ScrapeRequest) -> Result<EventStream, CommandError> {
    let pipeline = state.pipeline()?;
    tracing::info!(
        "Starting scrape of '{}' ({} m) into '{}'",
        request.area,
        request.radius_m,
        request.list_name
    );
    Ok(pipeline.run(request))
}

/// Write every event as one JSON line.
///
/// Returns `true` when the run ended with `done`.
pub async fn relay_events<W: Write>(
    mut events: EventStream,
    out: &mut W,
) -> Result<bool, CommandError> {
    let mut succeeded = false;
    while let Some(event) = events.next().await {
        if let ScrapeEvent::Done { .. } = event {
            succeeded = true;
        }
        serde_json::to_writer(&mut *out, &event)?;
        writeln!(out)?;
        out.flush()?;
    }
    Ok(succeeded)
}
