//! Series Regularization
//!
//! ## Overview
//!
//! Turns normalized rows of one well into a canonical series: one row per
//! minute, no duplicates, no nulls, ascending. Runs once per cleaning batch.
//!
//! ## Stages
//!
//! ```text
//! (time, record)*
//!   │ 1. drop rows whose time has non-zero seconds
//!   │ 2. keep the first row per timestamp, then sort by time
//!   │ 3. drop outliers beyond the densest max-span window
//!   │ 4. fill well_id/class, impute each sensor by its null fraction
//!   │ 5. reindex onto every minute between first and last row
//!   ▼
//! CanonicalRecord*
//! ```
//!
//! Imputation bands (null fraction `p` per sensor):
//!
//! | `p`            | Strategy                                   |
//! |----------------|--------------------------------------------|
//! | `0`            | untouched                                  |
//! | `(0, 0.05)`    | row interpolation, boundaries held flat    |
//! | `[0.05, 0.20)` | forward fill, then backward fill           |
//! | `[0.20, 1)`    | class mean, then column mean               |
//! | `1`            | column dropped                             |
//!
//! Running the regularizer on its own output changes nothing.
//!
//! ## Usage Example
//!
//! ```rust
//! use wellseries_core::{Normalizer, RawRecord, Regularizer, RegularizerConfig};
//!
//! let mut normalizer = Normalizer::default();
//! let batch = normalizer.normalize_batch(vec![
//!     RawRecord::new().with("Timesteap", "day1 12:01:00 AM").with("P-PDG", None::<f64>),
//!     RawRecord::new().with("Timesteap", "day1 12:02:00 AM").with("P-PDG", 100.0),
//! ]);
//!
//! let series = Regularizer::new(RegularizerConfig::default()).regularize(&batch.records);
//! assert_eq!(series.records.len(), 2);
//! assert!(series.records.iter().all(|r| r.sensors["p_pdg"] == 100.0));
//! ```

pub mod impute;
pub mod resample;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::RegularizerConfig,
    normalizer::NormalizedRecord,
    record::CanonicalRecord,
    time::{is_minute_aligned, AbsoluteTime},
};

pub use impute::{
    class_mean_fill, forward_backward_fill, impute_column, interpolate, null_fraction, ImputationStrategy,
};
pub use resample::{densest_window, resample, SeriesFrame};

/// How one sensor column was filled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnImputation {
    /// Sensor name
    pub field: String,
    /// Nulls after deduplication
    pub nulls: usize,
    /// `nulls / rows`
    pub null_fraction: f64,
    /// Strategy applied
    pub strategy: ImputationStrategy,
}

/// Counts from one regularization run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegularizeReport {
    /// Rows received
    pub input: usize,
    /// Rows with non-zero seconds
    pub dropped_unaligned: usize,
    /// Rows repeating an earlier timestamp
    pub dropped_duplicates: usize,
    /// Rows too far from the rest of their well's series
    pub dropped_out_of_span: usize,
    /// Per-sensor imputation, only for columns that had nulls
    pub imputed: Vec<ColumnImputation>,
    /// Sensors with no value in any row
    pub dropped_columns: Vec<String>,
    /// Minutes inserted by resampling
    pub gap_slots: usize,
    /// Rows emitted
    pub output: usize,
}

impl RegularizeReport {
    /// Fold another run's counts into this one
    pub fn absorb(&mut self, other: RegularizeReport) {
        self.input += other.input;
        self.dropped_unaligned += other.dropped_unaligned;
        self.dropped_duplicates += other.dropped_duplicates;
        self.dropped_out_of_span += other.dropped_out_of_span;
        self.imputed.extend(other.imputed);
        for column in other.dropped_columns {
            if !self.dropped_columns.contains(&column) {
                self.dropped_columns.push(column);
            }
        }
        self.gap_slots += other.gap_slots;
        self.output += other.output;
    }
}

/// Canonical rows plus the run report
#[derive(Debug, Clone, Default)]
pub struct Regularized {
    /// Canonical series
    pub records: Vec<CanonicalRecord>,
    /// What happened along the way
    pub report: RegularizeReport,
}

/// Batch regularizer
#[derive(Debug, Clone, Default)]
pub struct Regularizer {
    config: RegularizerConfig,
}

impl Regularizer {
    /// Create a regularizer
    pub fn new(config: RegularizerConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &RegularizerConfig {
        &self.config
    }

    /// Regularize one series
    pub fn regularize(&self, records: &[NormalizedRecord]) -> Regularized {
        let regularized = self.regularize_rows(records.iter().collect());
        self.log_summary(&regularized.report);
        regularized
    }

    /// Regularize already-canonical rows, e.g. a stored series
    pub fn regularize_canonical(&self, records: &[CanonicalRecord]) -> Regularized {
        let rows: Vec<NormalizedRecord> = records
            .iter()
            .map(|r| NormalizedRecord { at: r.timestamp, record: r.to_raw() })
            .collect();
        self.regularize(&rows)
    }

    /// Partition by well and regularize each well on its own
    ///
    /// Rows without a well id go to the default well. Output is ordered by
    /// well id, then time.
    pub fn regularize_wells(&self, records: &[NormalizedRecord]) -> Regularized {
        let mut wells: BTreeMap<i64, Vec<&NormalizedRecord>> = BTreeMap::new();
        for record in records {
            let well = record.record.well_id().unwrap_or(self.config.default_well_id);
            wells.entry(well).or_default().push(record);
        }

        let mut out = Regularized::default();
        for (well, rows) in wells {
            let mut part = self.regularize_rows(rows);
            for record in &mut part.records {
                record.well_id = well;
            }
            debug!("well {well}: {} rows", part.records.len());
            out.records.append(&mut part.records);
            out.report.absorb(part.report);
        }

        self.log_summary(&out.report);
        out
    }

    fn regularize_rows(&self, rows: Vec<&NormalizedRecord>) -> Regularized {
        let mut report = RegularizeReport { input: rows.len(), ..Default::default() };

        let aligned: Vec<&NormalizedRecord> = rows.into_iter().filter(|r| is_minute_aligned(&r.at)).collect();
        report.dropped_unaligned = report.input - aligned.len();

        let mut seen: HashSet<AbsoluteTime> = HashSet::with_capacity(aligned.len());
        let mut unique: Vec<&NormalizedRecord> = aligned.into_iter().filter(|r| seen.insert(r.at)).collect();
        report.dropped_duplicates = report.input - report.dropped_unaligned - unique.len();
        unique.sort_by_key(|r| r.at);

        let times: Vec<AbsoluteTime> = unique.iter().map(|r| r.at).collect();
        let window = densest_window(&times, self.config.max_span_minutes);
        report.dropped_out_of_span = unique.len() - window.len();
        if report.dropped_out_of_span > 0 {
            warn!(
                "dropping {} rows outside a {} minute span starting {}",
                report.dropped_out_of_span, self.config.max_span_minutes, times[window.start]
            );
        }
        unique.truncate(window.end);
        unique.drain(..window.start);

        if unique.is_empty() {
            return Regularized { records: Vec::new(), report };
        }

        let mut frame = self.build_frame(&unique);
        self.fill_identity(&mut frame);

        let classes: Vec<i64> = frame.classes.iter().map(|c| c.unwrap_or(self.config.default_class)).collect();
        let mut dropped = Vec::new();
        for (field, column) in frame.sensors.iter_mut() {
            let nulls = column.iter().filter(|v| v.is_none()).count();
            if nulls == column.len() {
                dropped.push(field.clone());
                continue;
            }
            let fraction = null_fraction(column);
            let strategy = impute_column(&classes, column, &self.config);
            if strategy != ImputationStrategy::Untouched {
                debug!("{field}: {nulls} nulls ({:.1}%) filled by {strategy:?}", fraction * 100.0);
                report.imputed.push(ColumnImputation { field: field.clone(), nulls, null_fraction: fraction, strategy });
            }
        }
        for field in &dropped {
            warn!("dropping sensor '{field}': no values in any row");
            frame.sensors.remove(field);
        }
        report.dropped_columns = dropped;

        let (grid, inserted) = match resample(&frame, self.config.max_span_minutes) {
            Ok(resampled) => resampled,
            Err(err) => {
                warn!("{err}; dropping the series");
                report.dropped_out_of_span += frame.len();
                return Regularized { records: Vec::new(), report };
            }
        };
        report.gap_slots = inserted;

        let records = self.emit(&grid);
        report.output = records.len();
        Regularized { records, report }
    }

    fn build_frame(&self, rows: &[&NormalizedRecord]) -> SeriesFrame {
        let values: Vec<BTreeMap<String, Option<f64>>> = rows.iter().map(|r| r.record.sensor_values()).collect();
        let names: BTreeSet<&String> = values.iter().flat_map(|v| v.keys()).collect();

        SeriesFrame {
            times: rows.iter().map(|r| r.at).collect(),
            well_ids: rows.iter().map(|r| r.record.well_id()).collect(),
            classes: rows.iter().map(|r| r.record.class()).collect(),
            sensors: names
                .into_iter()
                .map(|name| (name.clone(), values.iter().map(|v| v.get(name).copied().flatten()).collect()))
                .collect(),
        }
    }

    fn fill_identity(&self, frame: &mut SeriesFrame) {
        forward_backward_fill(&mut frame.well_ids);
        forward_backward_fill(&mut frame.classes);
        for id in frame.well_ids.iter_mut().filter(|v| v.is_none()) {
            *id = Some(self.config.default_well_id);
        }
        for class in frame.classes.iter_mut().filter(|v| v.is_none()) {
            *class = Some(self.config.default_class);
        }
    }

    fn emit(&self, grid: &SeriesFrame) -> Vec<CanonicalRecord> {
        (0..grid.len())
            .map(|i| CanonicalRecord {
                timestamp: grid.times[i],
                well_id: grid.well_ids[i].unwrap_or(self.config.default_well_id),
                class: grid.classes[i].unwrap_or(self.config.default_class),
                sensors: grid
                    .sensors
                    .iter()
                    .filter_map(|(name, column)| column[i].map(|v| (name.clone(), v)))
                    .collect(),
            })
            .collect()
    }

    fn log_summary(&self, report: &RegularizeReport) {
        info!(
            "regularized {} rows into {} ({} unaligned, {} duplicate, {} out of span, {} gap minutes filled)",
            report.input,
            report.output,
            report.dropped_unaligned,
            report.dropped_duplicates,
            report.dropped_out_of_span,
            report.gap_slots
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::RawRecord, time::parse_naive_iso};

    fn at(ts: &str) -> AbsoluteTime {
        parse_naive_iso(ts).unwrap()
    }

    fn normalized(ts: &str, record: RawRecord) -> NormalizedRecord {
        NormalizedRecord { at: at(ts), record }
    }

    #[test]
    fn drops_unaligned_and_duplicates() {
        let rows = vec![
            normalized("2024-01-01T00:02:00", RawRecord::new().with("p_pdg", 2.0)),
            normalized("2024-01-01T00:01:30", RawRecord::new().with("p_pdg", 9.0)),
            normalized("2024-01-01T00:01:00", RawRecord::new().with("p_pdg", 1.0)),
            normalized("2024-01-01T00:02:00", RawRecord::new().with("p_pdg", 7.0)),
        ];
        let out = Regularizer::default().regularize(&rows);

        assert_eq!(out.report.dropped_unaligned, 1);
        assert_eq!(out.report.dropped_duplicates, 1);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].sensors["p_pdg"], 1.0);
        assert_eq!(out.records[1].sensors["p_pdg"], 2.0);
    }

    #[test]
    fn identity_columns_default_when_absent() {
        let rows = vec![normalized("2024-01-01T00:00:00", RawRecord::new().with("p_pdg", 1.0))];
        let out = Regularizer::new(RegularizerConfig::default().with_default_well_id(7)).regularize(&rows);
        assert_eq!(out.records[0].well_id, 7);
        assert_eq!(out.records[0].class, 0);
    }

    #[test]
    fn all_null_column_is_dropped() {
        let rows = vec![
            normalized("2024-01-01T00:00:00", RawRecord::new().with("p_pdg", 1.0).with("qgl", None::<f64>)),
            normalized("2024-01-01T00:01:00", RawRecord::new().with("p_pdg", 2.0).with("qgl", "n/a")),
        ];
        let out = Regularizer::default().regularize(&rows);
        assert_eq!(out.report.dropped_columns, vec!["qgl".to_string()]);
        assert!(out.records.iter().all(|r| !r.sensors.contains_key("qgl")));
    }

    #[test]
    fn wells_are_regularized_independently() {
        let rows = vec![
            normalized("2024-01-01T00:00:00", RawRecord::new().with("well_id", 2i64).with("p_pdg", 1.0)),
            normalized("2024-01-01T00:00:00", RawRecord::new().with("well_id", 1i64).with("p_pdg", 5.0)),
            normalized("2024-01-01T00:02:00", RawRecord::new().with("well_id", 2i64).with("p_pdg", 3.0)),
        ];
        let out = Regularizer::default().regularize_wells(&rows);

        let wells: Vec<_> = out.records.iter().map(|r| (r.well_id, r.sensors["p_pdg"])).collect();
        assert_eq!(wells, vec![(1, 5.0), (2, 1.0), (2, 2.0), (2, 3.0)]);
        assert_eq!(out.report.gap_slots, 1);
        assert_eq!(out.report.input, 3);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = Regularizer::default().regularize(&[]);
        assert!(out.records.is_empty());
        assert_eq!(out.report, RegularizeReport::default());
    }
}
