//! Common fixtures and assertions for integration tests
//!
//! This module provides:
//! - Raw export builders in the shapes real well logs arrive in
//! - A deterministic series generator with gaps and nulls
//! - Invariant checks for canonical series

#![allow(dead_code)]

use chrono::Duration;

use wellseries_core::{
    time::{parse_naive_iso, AbsoluteTime},
    CanonicalRecord, FieldValue, Normalizer, NormalizedRecord, RawRecord,
};

/// Parse a fixture timestamp
pub fn at(ts: &str) -> AbsoluteTime {
    parse_naive_iso(ts).unwrap_or_else(|| panic!("bad fixture timestamp {ts}"))
}

/// One row of a `dayN h:mm:ss AM` export
pub fn day_row(day: u32, time: &str, p_pdg: Option<f64>, class: i64) -> RawRecord {
    RawRecord::new()
        .with("Timesteap", format!("day{day} {time}").as_str())
        .with("P-PDG", p_pdg)
        .with("class", class)
}

/// Canonical row with one sensor
pub fn canonical(ts: &str, well_id: i64, class: i64, p_pdg: f64) -> CanonicalRecord {
    CanonicalRecord::new(at(ts), well_id, class).with_sensor("p_pdg", p_pdg)
}

/// Normalize a raw export with default settings
pub fn normalize(rows: Vec<RawRecord>) -> Vec<NormalizedRecord> {
    Normalizer::default().normalize_batch(rows).records
}

/// Small deterministic generator for noisy minute exports
pub struct ExportGenerator {
    seed: u64,
}

impl ExportGenerator {
    /// Generator with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn next(&mut self) -> f64 {
        // xorshift
        self.seed ^= self.seed << 13;
        self.seed ^= self.seed >> 7;
        self.seed ^= self.seed << 17;
        (self.seed % 10_000) as f64 / 10_000.0
    }

    /// `minutes` rows of ISO timestamps with some rows missing, some
    /// duplicated and `null_ratio` of pressure readings blank
    pub fn iso_export(&mut self, well_id: i64, minutes: i64, null_ratio: f64) -> Vec<RawRecord> {
        let start = at("2024-01-01T00:00:00");
        let mut rows = Vec::new();

        for m in 0..minutes {
            let roll = self.next();
            if m > 0 && m < minutes - 1 && roll < 0.05 {
                continue;
            }
            let ts = (start + Duration::minutes(m)).format("%Y-%m-%dT%H:%M:%S").to_string();
            let pressure = if self.next() < null_ratio { FieldValue::Null } else { FieldValue::Number(200.0 + self.next() * 10.0) };
            let row = RawRecord::new()
                .with("timestamp", ts.as_str())
                .with("well_id", well_id)
                .with("class", if m % 60 < 45 { 0i64 } else { 3i64 })
                .with("P-PDG", pressure)
                .with("T-TPT", 80.0 + self.next());
            if roll > 0.97 {
                rows.push(row.clone());
            }
            rows.push(row);
        }

        rows
    }
}

/// Consecutive timestamps are exactly one minute apart
pub fn assert_minute_spaced(series: &[CanonicalRecord]) {
    for pair in series.windows(2) {
        assert_eq!(
            pair[1].timestamp - pair[0].timestamp,
            Duration::minutes(1),
            "gap between {} and {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}

/// Every row carries every sensor, all finite
pub fn assert_complete(series: &[CanonicalRecord]) {
    let Some(first) = series.first() else {
        return;
    };
    let names: Vec<_> = first.sensors.keys().collect();
    for row in series {
        assert_eq!(row.sensors.keys().collect::<Vec<_>>(), names, "row {} missing a sensor", row.timestamp);
        assert!(row.sensors.values().all(|v| v.is_finite()), "row {} has a non-finite value", row.timestamp);
    }
}
