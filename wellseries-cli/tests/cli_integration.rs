//! Command-line round trip: clean an export, then query it

use std::fs;

use clap::Parser;
use serde_json::Value;

use wellseries_cli::{execute, Cli};

fn run(args: &[&str]) -> anyhow::Result<Value> {
    let cli = Cli::try_parse_from(std::iter::once("wellseries").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    execute(&cli, &mut out)?;
    Ok(serde_json::from_slice(&out)?)
}

#[test]
fn clean_then_query_from_the_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.json");
    let processed = dir.path().join("out").join("processed.json");
    let config = dir.path().join("config.json");
    fs::write(
        &raw,
        r#"[
            {"Timesteap": "day1 12:01:00 AM", "P-PDG": 10.0, "well_id": 3},
            {"Timesteap": "day1 12:03:00 AM", "P-PDG": 30.0, "well_id": 3},
            {"Timesteap": "nonsense", "P-PDG": 1.0, "well_id": 3}
        ]"#,
    )
    .unwrap();
    fs::write(&config, r#"{"normalizer": {"base_date": "2023-06-01"}}"#).unwrap();

    let summary = run(&[
        "clean",
        raw.to_str().unwrap(),
        "-o",
        processed.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(summary["normalize"]["accepted"], 2);
    assert_eq!(summary["regularize"]["output"], 3);
    assert_eq!(summary["regularize"]["gap_slots"], 1);

    let series = run(&["timeseries", "-d", processed.to_str().unwrap(), "--well-id", "3"]).unwrap();
    assert_eq!(series["count"], 3);
    assert_eq!(series["points"][0]["name"], "2023-06-01T00:01:00");
    assert_eq!(series["points"][1]["value"]["p_pdg"], 20.0);

    let health = run(&["health", "-d", processed.to_str().unwrap()]).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["records"], 3);
}

#[test]
fn bad_arguments_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    assert!(run(&["timeseries", "-d", missing.to_str().unwrap(), "-g", "week"]).is_err());
    assert!(run(&["timeseries", "-d", missing.to_str().unwrap(), "--limit-policy", "middle"]).is_err());
    assert!(run(&["clean", missing.to_str().unwrap(), "--base-date", "June"]).is_err());

    let health = run(&["health", "-d", missing.to_str().unwrap()]).unwrap();
    assert_eq!(health["status"], "unavailable");
}
