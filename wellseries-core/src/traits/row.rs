//! Rows the aggregation engine can scan
//!
//! The engine normally runs over the canonical series, but it also accepts
//! normalized raw rows that were never regularized. Both implement
//! [`SeriesRow`].

use crate::{
    normalizer::NormalizedRecord,
    record::CanonicalRecord,
    time::AbsoluteTime,
};

/// A timestamped row with a well, a class and numeric sensor values
pub trait SeriesRow {
    /// Absolute time of the row
    fn timestamp(&self) -> AbsoluteTime;

    /// Well identifier, if the row carries one
    fn well_id(&self) -> Option<i64>;

    /// Class code, if the row carries one
    fn class(&self) -> Option<i64>;

    /// Visit every sensor that has a numeric value
    fn visit_sensors(&self, visit: &mut dyn FnMut(&str, f64));
}

impl SeriesRow for CanonicalRecord {
    fn timestamp(&self) -> AbsoluteTime {
        self.timestamp
    }

    fn well_id(&self) -> Option<i64> {
        Some(self.well_id)
    }

    fn class(&self) -> Option<i64> {
        Some(self.class)
    }

    fn visit_sensors(&self, visit: &mut dyn FnMut(&str, f64)) {
        for (name, value) in &self.sensors {
            visit(name, *value);
        }
    }
}

impl SeriesRow for NormalizedRecord {
    fn timestamp(&self) -> AbsoluteTime {
        self.at
    }

    fn well_id(&self) -> Option<i64> {
        self.record.well_id()
    }

    fn class(&self) -> Option<i64> {
        self.record.class()
    }

    fn visit_sensors(&self, visit: &mut dyn FnMut(&str, f64)) {
        for (name, value) in self.record.sensor_values() {
            if let Some(value) = value {
                visit(&name, value);
            }
        }
    }
}
