//! Streaming scrape pipeline.
//!
//! A run loads the target list, geocodes the area, sweeps the search grid
//! once per keyword, fetches details for new candidates and appends them to
//! the list. Every step reports through an [`EventStream`] that ends with
//! exactly one `done` or `error` event.
//!
//! Events travel over a channel of capacity one, so a slow consumer paces
//! the run. A consumer that disconnects before the save step stops the run
//! without touching the list; once saving starts the run finishes regardless.

use crate::error::{Result, ScanError};
use crate::events::{percent, EventStream, ProgressKind, ScrapeEvent};
use crate::grid::{self, SearchGrid, DEFAULT_QUERY_RADIUS_FACTOR};
use crate::ledger::{Admission, DeduplicationLedger};
use futures::StreamExt;
use leadgrid_core::{GeoPoint, PlaceId, ScrapingConfig, Timestamp};
use leadgrid_places::{DetailField, NearbyQuery, PlaceDetails, PlacesGateway};
use leadgrid_store::{Record, SearchLogEntry, TabularStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Emit a grid progress log line every this many points within a keyword.
const GRID_LOG_INTERVAL: usize = 5;

/// Emit a details progress log line every this many candidates.
const DETAILS_LOG_INTERVAL: usize = 10;

/// Parameters of one scrape run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    /// Free-text area to geocode, e.g. "Monza, Italy"
    pub area: String,
    /// Radius around the area center, in meters
    pub radius_m: u32,
    /// Keywords searched at every grid point
    pub keywords: Vec<String>,
    /// Target list
    pub list_name: String,
    /// Grid spacing override, in meters
    pub grid_step_m: Option<u32>,
}

impl ScrapeRequest {
    /// Request with the configured grid step.
    #[must_use]
    pub fn new(
        area: impl Into<String>,
        radius_m: u32,
        keywords: Vec<String>,
        list_name: impl Into<String>,
    ) -> Self {
        Self {
            area: area.into(),
            radius_m,
            keywords,
            list_name: list_name.into(),
            grid_step_m: None,
        }
    }

    /// Override the grid step.
    #[must_use]
    pub fn with_grid_step(mut self, step_m: u32) -> Self {
        self.grid_step_m = Some(step_m);
        self
    }

    /// Keywords with surrounding whitespace removed and blanks dropped.
    #[must_use]
    pub fn clean_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.area.trim().is_empty() {
            return Err(ScanError::InvalidRequest("area is required".to_string()));
        }
        if self.radius_m == 0 {
            return Err(ScanError::InvalidRequest(
                "radius must be greater than zero".to_string(),
            ));
        }
        if self.clean_keywords().is_empty() {
            return Err(ScanError::InvalidRequest(
                "at least one keyword is required".to_string(),
            ));
        }
        if self.grid_step_m == Some(0) {
            return Err(ScanError::InvalidRequest(
                "grid step must be greater than zero".to_string(),
            ));
        }
        if self.list_name.trim().is_empty() {
            return Err(ScanError::InvalidRequest("list name is required".to_string()));
        }
        Ok(())
    }
}

/// Tunables for the grid sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    /// Grid step used when the request does not set one
    pub default_grid_step_m: u32,
    /// Maximum result pages per (keyword, point)
    pub max_pages_per_point: u32,
    /// Wait before each continuation request
    pub page_token_delay: Duration,
    /// Per-query radius as a multiple of the grid step
    pub query_radius_factor: f64,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            default_grid_step_m: 500,
            max_pages_per_point: 3,
            page_token_delay: Duration::from_secs(2),
            query_radius_factor: DEFAULT_QUERY_RADIUS_FACTOR,
        }
    }
}

impl From<&ScrapingConfig> for ScrapeSettings {
    fn from(config: &ScrapingConfig) -> Self {
        Self {
            default_grid_step_m: config.grid_step_m,
            max_pages_per_point: config.max_pages_per_point,
            page_token_delay: config.page_token_delay(),
            query_radius_factor: config.query_radius_factor,
        }
    }
}

/// A first sighting waiting for its details lookup.
#[derive(Debug, Clone)]
struct Candidate {
    place_id: PlaceId,
    name: String,
    keyword: String,
}

/// Runs scrape requests against a gateway and a list store.
#[derive(Clone)]
pub struct ScrapePipeline {
    gateway: Arc<dyn PlacesGateway>,
    store: Arc<TabularStore>,
    settings: ScrapeSettings,
}

impl ScrapePipeline {
    /// Create a pipeline with default settings.
    #[must_use]
    pub fn new(gateway: Arc<dyn PlacesGateway>, store: Arc<TabularStore>) -> Self {
        Self {
            gateway,
            store,
            settings: ScrapeSettings::default(),
        }
    }

    /// Replace the sweep settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ScrapeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    /// Start a run in the background and return its event stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, request: ScrapeRequest) -> EventStream {
        let (tx, rx) = mpsc::channel(1);
        let pipeline = self.clone();
        let span = tracing::info_span!("scrape", list = %request.list_name, area = %request.area);

        tokio::spawn(
            async move {
                let emitter = Emitter { tx };
                match pipeline.execute(&request, &emitter).await {
                    Ok(()) => tracing::info!("scrape run finished"),
                    Err(ScanError::Cancelled) => {
                        tracing::info!("event consumer disconnected, run abandoned");
                    }
                    Err(e) => {
                        tracing::error!("scrape run failed: {}", e);
                        emitter
                            .notify(ScrapeEvent::Error {
                                message: e.to_string(),
                            })
                            .await;
                    }
                }
            }
            .instrument(span),
        );

        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed()
    }

    async fn execute(&self, request: &ScrapeRequest, emitter: &Emitter) -> Result<()> {
        request.validate()?;
        let keywords = request.clean_keywords();
        let list = request.list_name.trim();
        let step_m = request
            .grid_step_m
            .unwrap_or(self.settings.default_grid_step_m);

        // Load
        emitter
            .send(ScrapeEvent::log(format!("Loading list '{list}'...")))
            .await?;
        let existing = self
            .store
            .read_all(list)
            .await
            .map_err(|e| ScanError::from_store(list, e))?;
        let mut ledger = DeduplicationLedger::from_records(&existing);
        emitter
            .send(ScrapeEvent::log(format!(
                "List loaded: {} existing records.",
                ledger.known_len()
            )))
            .await?;

        // Geocode
        let area = request.area.trim();
        emitter
            .send(ScrapeEvent::log(format!("Resolving coordinates for '{area}'...")))
            .await?;
        let center = self
            .gateway
            .geocode(area)
            .await?
            .ok_or_else(|| ScanError::LocationNotFound {
                area: area.to_string(),
            })?;
        emitter
            .send(ScrapeEvent::log(format!("Center found: {center}")))
            .await?;

        // Grid
        let grid = grid::plan_with_factor(
            center,
            f64::from(request.radius_m),
            f64::from(step_m),
            self.settings.query_radius_factor,
        )?;
        tracing::debug!(
            points = grid.len(),
            query_radius_m = grid.query_radius_m,
            "search grid planned"
        );
        emitter
            .send(ScrapeEvent::log(format!(
                "Grid built: searching {} points inside the area.",
                grid.len()
            )))
            .await?;

        let candidates = self
            .sweep_grid(&grid, &keywords, &mut ledger, emitter)
            .await?;

        emitter
            .send(ScrapeEvent::log(format!(
                "Grid search complete. Found {} NEW places to extract \
                 (ignored {} duplicates within the grid and {} already in the list).",
                candidates.len(),
                ledger.duplicates_in_run(),
                ledger.duplicates_in_store()
            )))
            .await?;

        if candidates.is_empty() {
            emitter
                .send(ScrapeEvent::log("No new places found. The list is unchanged."))
                .await?;
            emitter.send(ScrapeEvent::Done { data: existing }).await?;
            return Ok(());
        }

        let records = self.fetch_details(candidates, emitter).await?;
        if records.is_empty() {
            emitter
                .send(ScrapeEvent::log(
                    "No details could be fetched. The list is unchanged.",
                ))
                .await?;
            emitter.send(ScrapeEvent::Done { data: existing }).await?;
            return Ok(());
        }

        emitter
            .send(ScrapeEvent::log(format!(
                "Details extraction complete. Saving to '{list}'..."
            )))
            .await?;

        let entry = SearchLogEntry {
            searched_at: Timestamp::now(),
            area: area.to_string(),
            radius_m: request.radius_m,
            grid_step_m: step_m,
            keywords,
            grid_points: grid.len(),
            new_records: records.len(),
        };
        self.persist(list, records, entry, emitter).await
    }

    /// Sweep every (keyword, point) pair, returning accepted candidates in
    /// discovery order.
    async fn sweep_grid(
        &self,
        grid: &SearchGrid,
        keywords: &[String],
        ledger: &mut DeduplicationLedger,
        emitter: &Emitter,
    ) -> Result<Vec<Candidate>> {
        let total = keywords.len() * grid.len();
        let mut done = 0;
        let mut candidates = Vec::new();

        emitter
            .send(ScrapeEvent::progress(
                ProgressKind::Grid,
                0,
                "Grid search started...",
            ))
            .await?;

        for keyword in keywords {
            emitter
                .send(ScrapeEvent::log(format!(
                    "--- Starting extraction for keyword '{keyword}' ---"
                )))
                .await?;

            for (index, point) in grid.points.iter().enumerate() {
                if index > 0 && index % GRID_LOG_INTERVAL == 0 {
                    emitter
                        .send(ScrapeEvent::log(format!(
                            "Progress: search point {index}/{}...",
                            grid.len()
                        )))
                        .await?;
                }

                for (place_id, name) in self
                    .search_point(*point, grid.query_radius_m, keyword)
                    .await?
                {
                    if ledger.admit(place_id.as_str()) == Admission::Accept {
                        candidates.push(Candidate {
                            place_id,
                            name,
                            keyword: keyword.clone(),
                        });
                    }
                }

                done += 1;
                emitter
                    .send(ScrapeEvent::progress(
                        ProgressKind::Grid,
                        percent(done, total),
                        format!("Area search ({done}/{total}) - '{keyword}'"),
                    ))
                    .await?;
            }
        }

        Ok(candidates)
    }

    /// Fetch up to `max_pages_per_point` pages for one (keyword, point) pair.
    ///
    /// Returns the ids and names of every stub that carried an id.
    async fn search_point(
        &self,
        point: GeoPoint,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<(PlaceId, String)>> {
        let mut query = NearbyQuery::new(point, radius_m, keyword);
        let mut found = Vec::new();

        for _ in 0..self.settings.max_pages_per_point {
            if query.page_token.is_some() {
                // Continuation tokens only become valid after a short delay.
                tokio::time::sleep(self.settings.page_token_delay).await;
            }

            let page = self.gateway.search_nearby(&query).await?;
            for stub in page.results {
                let Some(place_id) = stub.place_id.and_then(|id| PlaceId::new(id).ok()) else {
                    continue;
                };
                found.push((place_id, stub.name.unwrap_or_default()));
            }

            match page.next_page_token {
                Some(token) => query = query.next_page(token),
                None => break,
            }
        }

        Ok(found)
    }

    /// Look up details for each candidate. Failures are reported and skipped.
    async fn fetch_details(
        &self,
        candidates: Vec<Candidate>,
        emitter: &Emitter,
    ) -> Result<Vec<Record>> {
        let total = candidates.len();
        let mut records = Vec::with_capacity(total);
        let mut failed_details = 0;
        let mut missing_places = 0;

        emitter
            .send(ScrapeEvent::log(
                "Fetching full details for each place (this will take a while)...",
            ))
            .await?;
        emitter
            .send(ScrapeEvent::progress(
                ProgressKind::Details,
                0,
                "Details extraction started...",
            ))
            .await?;

        for (index, candidate) in candidates.into_iter().enumerate() {
            if index % DETAILS_LOG_INTERVAL == 0 {
                emitter
                    .send(ScrapeEvent::log(format!(
                        "Details progress: [{index}/{total}]"
                    )))
                    .await?;
            }

            match self
                .gateway
                .place_details(&candidate.place_id, &DetailField::RECORD)
                .await
            {
                Ok(details) => records.push(build_record(candidate, details)),
                Err(e) if e.is_place_scoped() => {
                    missing_places += 1;
                    tracing::debug!(place_id = %candidate.place_id, "place no longer listed: {}", e);
                    emitter
                        .send(ScrapeEvent::log(format!(
                            "[!] '{}' is no longer listed by the provider, skipping.",
                            candidate.name
                        )))
                        .await?;
                }
                Err(e) => {
                    failed_details += 1;
                    tracing::warn!(place_id = %candidate.place_id, "details lookup failed: {}", e);
                    emitter
                        .send(ScrapeEvent::log(format!(
                            "[!] Failed to fetch details for '{}': {e}",
                            candidate.name
                        )))
                        .await?;
                }
            }

            let fetched = index + 1;
            emitter
                .send(ScrapeEvent::progress(
                    ProgressKind::Details,
                    percent(fetched, total),
                    format!("Fetching details ({fetched}/{total})"),
                ))
                .await?;
        }

        if failed_details + missing_places > 0 {
            tracing::info!(
                failed_details,
                missing_places,
                fetched = records.len(),
                "details phase finished with skipped places"
            );
        }
        Ok(records)
    }

    /// Append the new records and the search log entry.
    ///
    /// Runs to completion even if the consumer has gone away.
    async fn persist(
        &self,
        list: &str,
        records: Vec<Record>,
        entry: SearchLogEntry,
        emitter: &Emitter,
    ) -> Result<()> {
        let outcome = self
            .store
            .append_records(list, records)
            .await
            .map_err(|e| ScanError::from_store(list, e))?;

        if let Err(e) = self.store.append_search_log(list, entry).await {
            tracing::warn!("failed to record search history for '{}': {}", list, e);
            emitter
                .notify(ScrapeEvent::log(format!(
                    "[!] Records saved, but the search history could not be updated: {e}"
                )))
                .await;
        }

        let message = if outcome.skipped > 0 {
            format!(
                "SUCCESS: added {} new leads to the list ({} already present were skipped).",
                outcome.appended, outcome.skipped
            )
        } else {
            format!("SUCCESS: added {} new leads to the list.", outcome.appended)
        };
        emitter.notify(ScrapeEvent::log(message)).await;
        emitter
            .notify(ScrapeEvent::Done {
                data: outcome.records,
            })
            .await;
        Ok(())
    }
}

fn build_record(candidate: Candidate, details: PlaceDetails) -> Record {
    let name = details
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(candidate.name);

    let mut record = Record::new(candidate.place_id, name);
    record.address = details.formatted_address.unwrap_or_default();
    record.phone = details.formatted_phone_number.unwrap_or_default();
    record.website = details.website.unwrap_or_default();
    record.rating = details.rating;
    record.categories = details.types;
    record.keyword = candidate.keyword;
    record
}

/// Sending half of a run's event channel.
struct Emitter {
    tx: mpsc::Sender<ScrapeEvent>,
}

impl Emitter {
    /// Deliver `event`, failing with `Cancelled` if the consumer is gone.
    async fn send(&self, event: ScrapeEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| ScanError::Cancelled)
    }

    /// Deliver `event` if anyone is still listening.
    async fn notify(&self, event: ScrapeEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event dropped, consumer disconnected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ScrapeRequest {
        ScrapeRequest::new("Monza", 1000, vec!["bar".to_string()], "leads")
    }

    #[test]
    fn test_request_validation() {
        request().validate().expect("valid request");

        let mut bad = request();
        bad.area = "   ".to_string();
        assert!(matches!(bad.validate(), Err(ScanError::InvalidRequest(_))));

        let mut bad = request();
        bad.radius_m = 0;
        assert!(matches!(bad.validate(), Err(ScanError::InvalidRequest(_))));

        let mut bad = request();
        bad.keywords = vec![" ".to_string(), String::new()];
        assert!(matches!(bad.validate(), Err(ScanError::InvalidRequest(_))));

        let bad = request().with_grid_step(0);
        assert!(matches!(bad.validate(), Err(ScanError::InvalidRequest(_))));

        let mut bad = request();
        bad.list_name = String::new();
        assert!(matches!(bad.validate(), Err(ScanError::InvalidRequest(_))));
    }

    #[test]
    fn test_clean_keywords() {
        let mut req = request();
        req.keywords = vec![" pizza ".to_string(), String::new(), "bar".to_string()];
        assert_eq!(req.clean_keywords(), vec!["pizza", "bar"]);
    }

    #[test]
    fn test_settings_from_config() {
        let config = ScrapingConfig {
            grid_step_m: 250,
            max_pages_per_point: 2,
            page_token_delay_ms: 10,
            query_radius_factor: 2.0,
        };
        let settings = ScrapeSettings::from(&config);
        assert_eq!(settings.default_grid_step_m, 250);
        assert_eq!(settings.max_pages_per_point, 2);
        assert_eq!(settings.page_token_delay, Duration::from_millis(10));
        assert_eq!(ScrapeSettings::from(&ScrapingConfig::default()), ScrapeSettings::default());
    }

    #[test]
    fn test_build_record_falls_back_to_stub_name() {
        let candidate = Candidate {
            place_id: PlaceId::new("p1").expect("valid id"),
            name: "Stub Name".to_string(),
            keyword: "bar".to_string(),
        };
        let details = PlaceDetails {
            formatted_address: Some("Via Roma 1".to_string()),
            rating: Some(4.0),
            types: vec!["bar".to_string()],
            ..PlaceDetails::default()
        };

        let record = build_record(candidate, details);
        assert_eq!(record.name, "Stub Name");
        assert_eq!(record.address, "Via Roma 1");
        assert_eq!(record.phone, "");
        assert_eq!(record.keyword, "bar");
        assert!(!record.hidden && !record.called && !record.interested);
        assert!(record.note.is_empty());
    }
}
