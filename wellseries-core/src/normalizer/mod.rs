//! Timestamp Normalization
//!
//! ## Overview
//!
//! Turns one raw timestamp value, whose grammar is unknown up front, into an
//! absolute time or an explicit rejection. The normalizer owns a
//! [`RolloverContext`] so that bare time-of-day values resolve relative to the
//! record before them; it is therefore stateful and must see one series in
//! order.
//!
//! ## Resolution Order
//!
//! ```text
//! raw value ──► Iso8601 ──► DayOffset ──► TimeOfDay ──► Epoch ──► Rejected
//!                 │            │             │            │
//!                 └────────────┴──── first success wins ──┘
//! ```
//!
//! A strategy that recognizes a value but cannot resolve it lets the value fall
//! through. If nothing resolves it the rejection says whether any strategy
//! recognized it (`OutOfRange`) or none did (`Unrecognized`).
//!
//! ## Rejections Are Values
//!
//! Bad rows never abort a batch. [`Normalizer::normalize_batch`] drops them and
//! counts each [`Rejection`] in the [`NormalizeReport`], which is the only
//! place they surface.
//!
//! ## Usage Example
//!
//! ```rust
//! use wellseries_core::{Normalizer, NormalizerConfig, RawRecord};
//!
//! let mut normalizer = Normalizer::new(NormalizerConfig::default());
//! let batch = normalizer.normalize_batch(vec![
//!     RawRecord::new().with("Timesteap", "23:59:00"),
//!     RawRecord::new().with("Timesteap", "00:00:00"),
//!     RawRecord::new().with("Timesteap", "not a time"),
//! ]);
//!
//! assert_eq!(batch.records.len(), 2);
//! assert_eq!(batch.records[1].at.to_string(), "2024-01-02 00:00:00");
//! assert_eq!(batch.report.total_rejected(), 1);
//! ```

pub mod strategies;

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    config::NormalizerConfig,
    errors::Rejection,
    record::{normalize_field_name, FieldRole, FieldValue, RawRecord},
    time::{AbsoluteTime, RolloverContext},
    traits::{RawTimestamp, TimestampParser},
};

pub use strategies::{parse_time_of_day, decode_epoch, StrategySettings, TimestampStrategy};

/// Outcome of normalizing one value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalized {
    /// Resolved to an absolute time
    Resolved {
        /// Resolved time
        at: AbsoluteTime,
        /// Grammar that resolved it
        strategy: TimestampStrategy,
    },
    /// Dropped
    Rejected(Rejection),
}

impl Normalized {
    /// Resolved time, if any
    pub fn at(&self) -> Option<AbsoluteTime> {
        match self {
            Normalized::Resolved { at, .. } => Some(*at),
            Normalized::Rejected(_) => None,
        }
    }

    /// True when rejected
    pub fn is_rejected(&self) -> bool {
        matches!(self, Normalized::Rejected(_))
    }
}

/// A raw record with its resolved timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Resolved time
    pub at: AbsoluteTime,
    /// Record as loaded
    pub record: RawRecord,
}

/// Counts from one batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizeReport {
    /// Records resolved
    pub accepted: usize,
    /// Rejections by reason
    pub rejected: BTreeMap<Rejection, usize>,
    /// Accepted records by strategy name
    pub by_strategy: BTreeMap<&'static str, usize>,
}

impl NormalizeReport {
    /// Total rejected rows
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Rows seen
    pub fn total(&self) -> usize {
        self.accepted + self.total_rejected()
    }

    fn record(&mut self, outcome: &Normalized) {
        match outcome {
            Normalized::Resolved { strategy, .. } => {
                self.accepted += 1;
                *self.by_strategy.entry(strategy.name()).or_insert(0) += 1;
            }
            Normalized::Rejected(reason) => {
                *self.rejected.entry(*reason).or_insert(0) += 1;
            }
        }
    }
}

/// Resolved records plus the batch report
#[derive(Debug, Default, Clone)]
pub struct NormalizedBatch {
    /// Accepted records in input order
    pub records: Vec<NormalizedRecord>,
    /// Accept/reject counts
    pub report: NormalizeReport,
}

/// Stateful timestamp normalizer for one series
#[derive(Debug, Clone)]
pub struct Normalizer {
    strategies: [TimestampStrategy; 4],
    settings: StrategySettings,
    context: RolloverContext,
}

impl Normalizer {
    /// Create a normalizer with an empty rollover context
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            strategies: TimestampStrategy::ORDER,
            settings: StrategySettings {
                epoch_ms_threshold: config.epoch_ms_threshold,
                min_plausible_year: config.min_plausible_year,
            },
            context: RolloverContext::new(config.base_date),
        }
    }

    /// Last resolved time
    pub fn last_resolved(&self) -> Option<AbsoluteTime> {
        self.context.last_known()
    }

    /// Forget rollover state before starting another series
    pub fn reset(&mut self) {
        self.context.reset();
    }

    /// Normalize one raw timestamp value
    pub fn normalize(&mut self, value: &FieldValue) -> Normalized {
        let raw = match value {
            _ if value.is_missing() => return Normalized::Rejected(Rejection::Empty),
            FieldValue::Number(n) if !n.is_finite() => return Normalized::Rejected(Rejection::NonFinite),
            FieldValue::Number(n) => RawTimestamp::Numeric(*n),
            FieldValue::Text(s) => RawTimestamp::Text(s),
            FieldValue::Null | FieldValue::Bool(_) => return Normalized::Rejected(Rejection::Unrecognized),
        };
        self.normalize_raw(&raw)
    }

    /// Normalize a value already split into text/number
    pub fn normalize_raw(&mut self, raw: &RawTimestamp<'_>) -> Normalized {
        let mut recognized = false;

        for strategy in self.strategies {
            if !strategy.recognizes(raw) {
                continue;
            }
            recognized = true;

            match strategy.parse_with(raw, &self.context, &self.settings) {
                Some(at) => {
                    self.context.observe(at);
                    return Normalized::Resolved { at, strategy };
                }
                None => debug!("{} recognized {:?} but could not resolve it", strategy.name(), raw),
            }
        }

        Normalized::Rejected(if recognized { Rejection::OutOfRange } else { Rejection::Unrecognized })
    }

    /// Normalize the timestamp field of a record
    pub fn normalize_record(&mut self, record: &RawRecord) -> Normalized {
        match record.timestamp_value() {
            Some(value) => self.normalize(value),
            None => {
                let has_field = record
                    .iter()
                    .any(|(name, _)| FieldRole::of(&normalize_field_name(name)) == FieldRole::Timestamp);
                Normalized::Rejected(if has_field { Rejection::Empty } else { Rejection::MissingField })
            }
        }
    }

    /// Normalize a series in order, dropping rejected rows
    pub fn normalize_batch<I>(&mut self, records: I) -> NormalizedBatch
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut batch = NormalizedBatch::default();

        for record in records {
            let outcome = self.normalize_record(&record);
            batch.report.record(&outcome);
            if let Some(at) = outcome.at() {
                batch.records.push(NormalizedRecord { at, record });
            }
        }

        info!(
            "normalized {} of {} records ({} rows skipped)",
            batch.report.accepted,
            batch.report.total(),
            batch.report.total_rejected()
        );
        for (reason, count) in &batch.report.rejected {
            debug!("  skipped {count}: {reason}");
        }

        batch
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}
