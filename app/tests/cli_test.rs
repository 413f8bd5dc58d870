//! Command dispatch tests against a temporary lists directory.

use async_trait::async_trait;
use clap::Parser;
use leadgrid_app::cli::execute;
use leadgrid_app::error::codes;
use leadgrid_app::{AppState, Cli};
use leadgrid_core::{AppConfig, GeoPoint, PlaceId};
use leadgrid_places::{DetailField, NearbyPage, NearbyQuery, PlaceDetails, PlaceStub, PlacesGateway};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

/// Gateway that finds the same two places everywhere.
struct FixedGateway;

#[async_trait]
impl PlacesGateway for FixedGateway {
    async fn geocode(&self, query: &str) -> leadgrid_places::Result<Option<GeoPoint>> {
        Ok((query == "Testville").then(|| GeoPoint::new(45.0, 9.0).expect("valid point")))
    }

    async fn search_nearby(&self, _query: &NearbyQuery) -> leadgrid_places::Result<NearbyPage> {
        Ok(NearbyPage {
            results: vec![PlaceStub::new("p1", "One"), PlaceStub::new("p2", "Two")],
            next_page_token: None,
        })
    }

    async fn place_details(
        &self,
        place_id: &PlaceId,
        _fields: &[DetailField],
    ) -> leadgrid_places::Result<PlaceDetails> {
        Ok(PlaceDetails {
            name: Some(format!("Shop {place_id}")),
            ..PlaceDetails::default()
        })
    }

    fn provider_id(&self) -> &str {
        "fixed"
    }
}

async fn create_state(dir: &TempDir) -> AppState {
    let mut config = AppConfig::default();
    config.storage.lists_dir = Some(dir.path().to_path_buf());
    AppState::new(config)
        .await
        .expect("create state")
        .with_gateway(Arc::new(FixedGateway))
}

async fn run(state: &AppState, args: &[&str]) -> (bool, Vec<Value>) {
    let mut argv = vec!["leadgrid"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("parse args");

    let mut out = Vec::new();
    let ok = execute(state, cli.command, &mut out)
        .await
        .expect("command succeeds");
    let lines = String::from_utf8(out)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect();
    (ok, lines)
}

#[tokio::test]
async fn test_list_lifecycle() {
    let dir = TempDir::new().expect("create temp dir");
    let state = create_state(&dir).await;

    let (_, out) = run(&state, &["create", "leads"]).await;
    assert_eq!(out[0]["list"], "leads.json");

    let (_, out) = run(&state, &["lists"]).await;
    assert_eq!(out[0], serde_json::json!(["leads.json"]));

    let (_, out) = run(&state, &["show", "leads.json"]).await;
    assert_eq!(out[0], serde_json::json!([]));

    run(&state, &["delete", "leads"]).await;
    let (_, out) = run(&state, &["lists"]).await;
    assert_eq!(out[0], serde_json::json!([]));
}

#[tokio::test]
async fn test_scrape_streams_ndjson_and_rows_are_editable() {
    let dir = TempDir::new().expect("create temp dir");
    let state = create_state(&dir).await;
    run(&state, &["create", "leads"]).await;

    let (ok, events) = run(
        &state,
        &["scrape", "--area", "Testville", "--radius", "300", "-k", "bar", "--list", "leads"],
    )
    .await;
    assert!(ok);
    assert!(events.iter().all(|e| e["type"].is_string()));
    let done = events.last().expect("has events");
    assert_eq!(done["type"], "done");
    assert_eq!(done["data"].as_array().expect("data array").len(), 2);

    run(&state, &["mark", "leads", "p1", "call"]).await;
    run(&state, &["mark", "leads", "p2", "hide"]).await;
    run(&state, &["note", "leads", "p1", "call back monday"]).await;

    let (_, out) = run(&state, &["show", "leads"]).await;
    let rows = out[0].as_array().expect("rows");
    assert_eq!(rows[0]["called"], true);
    assert_eq!(rows[0]["note"], "call back monday");
    assert_eq!(rows[1]["hidden"], true);
    assert_eq!(rows[1]["called"], false);

    let (_, out) = run(&state, &["searches", "leads"]).await;
    let searches = out[0].as_array().expect("searches");
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0]["area"], "Testville");
    assert_eq!(searches[0]["keywords"], serde_json::json!(["bar"]));
}

#[tokio::test]
async fn test_scrape_unknown_area_reports_failure() {
    let dir = TempDir::new().expect("create temp dir");
    let state = create_state(&dir).await;
    run(&state, &["create", "leads"]).await;

    let (ok, events) = run(
        &state,
        &["scrape", "--area", "Nowhere", "--radius", "300", "-k", "bar", "--list", "leads"],
    )
    .await;
    assert!(!ok);
    assert_eq!(events.last().expect("has events")["type"], "error");
}

#[tokio::test]
async fn test_command_errors_carry_codes() {
    let dir = TempDir::new().expect("create temp dir");
    let state = create_state(&dir).await;

    let cli = Cli::try_parse_from(["leadgrid", "show", "missing"]).expect("parse args");
    let err = execute(&state, cli.command, &mut Vec::new())
        .await
        .expect_err("list does not exist");
    assert_eq!(err.code, codes::NOT_FOUND);

    run(&state, &["create", "leads"]).await;
    let cli = Cli::try_parse_from(["leadgrid", "create", "leads"]).expect("parse args");
    let err = execute(&state, cli.command, &mut Vec::new())
        .await
        .expect_err("duplicate list");
    assert_eq!(err.code, codes::ALREADY_EXISTS);

    let cli = Cli::try_parse_from(["leadgrid", "note", "leads", "ghost", "hi"]).expect("parse args");
    let err = execute(&state, cli.command, &mut Vec::new())
        .await
        .expect_err("row does not exist");
    assert_eq!(err.code, codes::NOT_FOUND);

    let cli = Cli::try_parse_from(["leadgrid", "create", "../escape"]).expect("parse args");
    let err = execute(&state, cli.command, &mut Vec::new())
        .await
        .expect_err("unsafe name");
    assert_eq!(err.code, codes::INVALID_INPUT);
}
