//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use ember_core::{AIClient, InsightConfig, InsightPipeline, JournalEntry, MockBackend, MockReply};
use tempfile::NamedTempFile;

use crate::cli::{Cli, Commands};
use crate::commands;

const ENTRIES: &str = r#"[
  {"id": "1", "date": "2026-10-13T20:00:00Z", "mood": "calm", "content": "Walk in the park after work."},
  {"id": "2", "date": "2026-10-15T21:00:00Z", "mood": "tired", "content": "Long meeting day, need sleep."},
  {"id": "3", "date": "2026-10-16T07:30:00Z", "content": "Coffee and a quiet morning."}
]"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn entries() -> Vec<JournalEntry> {
    serde_json::from_str(ENTRIES).unwrap()
}

fn mock_pipeline(backend: MockBackend) -> InsightPipeline {
    let config = Arc::new(InsightConfig::embedded().unwrap());
    InsightPipeline::new(config, AIClient::Mock(backend))
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_insight_args() {
    let cli = Cli::try_parse_from([
        "ember",
        "--verbose",
        "insight",
        "--entries",
        "week.json",
        "--now",
        "2026-10-18T12:00:00Z",
        "--raw",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Insight {
            entries,
            now,
            raw,
            json,
        } => {
            assert_eq!(entries.to_str(), Some("week.json"));
            assert_eq!(now.as_deref(), Some("2026-10-18T12:00:00Z"));
            assert!(raw);
            assert!(!json);
        }
        _ => panic!("Expected insight command"),
    }
}

#[test]
fn test_stats_requires_entries() {
    assert!(Cli::try_parse_from(["ember", "stats"]).is_err());
}

// ========== Shared Utility Tests ==========

#[test]
fn test_load_entries() {
    let file = write_temp(ENTRIES);
    let loaded = commands::load_entries(file.path()).unwrap();

    assert_eq!(loaded.len(), 3);
    assert!(loaded[2].mood.is_none());
}

#[test]
fn test_load_entries_invalid_json() {
    let file = write_temp("{ not entries");
    let err = commands::load_entries(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid entries JSON"));
}

#[test]
fn test_load_entries_missing_file() {
    let result = commands::load_entries(std::path::Path::new("/nonexistent/entries.json"));
    assert!(result.is_err());
}

#[test]
fn test_parse_now() {
    let parsed = commands::parse_now(Some("2026-10-18T14:00:00+02:00")).unwrap();
    assert_eq!(parsed, now());

    assert!(commands::parse_now(Some("last sunday")).is_err());
    assert!(commands::parse_now(None).is_ok());
}

#[test]
fn test_load_config_explicit_path() {
    let file = write_temp("[generation]\nmodel = \"local-model\"\n");
    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.generation.model, "local-model");

    let bad = write_temp("[generation]\ntemperature = 9.0\n");
    assert!(commands::load_config(Some(bad.path())).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_cmd_stats() {
    let pipeline = mock_pipeline(MockBackend::new());
    assert!(commands::cmd_stats(&pipeline, &entries(), now(), false).is_ok());
    assert!(commands::cmd_stats(&pipeline, &entries(), now(), true).is_ok());
    assert!(commands::cmd_stats(&pipeline, &[], now(), false).is_ok());
}

#[test]
fn test_cmd_prompt() {
    let pipeline = mock_pipeline(MockBackend::new());
    assert!(commands::cmd_prompt(&pipeline, &entries(), now()).is_ok());
}

#[test]
fn test_cmd_config() {
    let config = InsightConfig::embedded().unwrap();
    assert!(commands::cmd_config(&config).is_ok());
}

#[tokio::test]
async fn test_cmd_insight_with_mock() {
    let backend = MockBackend::new();
    let pipeline = mock_pipeline(backend.clone());

    let result =
        commands::cmd_insight(&pipeline, &entries(), now(), Some("sk-test"), false, false).await;
    assert!(result.is_ok());

    let result =
        commands::cmd_insight(&pipeline, &entries(), now(), Some("sk-test"), false, true).await;
    assert!(result.is_ok());

    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_cmd_insight_raw() {
    let backend = MockBackend::with_reply(MockReply::Text("not json at all".into()));
    let pipeline = mock_pipeline(backend);

    // Raw mode shows unparseable output instead of failing
    let result =
        commands::cmd_insight(&pipeline, &entries(), now(), Some("sk-test"), true, true).await;
    assert!(result.is_ok());

    let result =
        commands::cmd_insight(&pipeline, &entries(), now(), Some("sk-test"), false, false).await;
    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Something went wrong while generating your weekly insight."
    );
}

#[tokio::test]
async fn test_cmd_insight_without_credential() {
    let backend = MockBackend::new();
    let pipeline = mock_pipeline(backend.clone());

    let err = commands::cmd_insight(&pipeline, &entries(), now(), None, false, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains(commands::CREDENTIAL_ENV));
    assert!(backend.requests().is_empty());
}
