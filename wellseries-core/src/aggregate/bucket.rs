//! Per-bucket running sums

use std::collections::BTreeMap;

/// Running sums for one bucket
#[derive(Debug, Default, Clone)]
pub struct BucketAccumulator {
    fields: BTreeMap<String, (f64, usize)>,
    samples: usize,
}

impl BucketAccumulator {
    /// Count one contributing row
    pub fn add_sample(&mut self) {
        self.samples += 1;
    }

    /// Add one field value
    pub fn add(&mut self, field: &str, value: f64) {
        match self.fields.get_mut(field) {
            Some((sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => {
                self.fields.insert(field.to_string(), (value, 1));
            }
        }
    }

    /// Rows that fell into the bucket
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Rounded mean per field that saw at least one value
    pub fn means(&self, decimals: u32) -> BTreeMap<String, f64> {
        self.fields
            .iter()
            .map(|(name, (sum, count))| (name.clone(), round_to(sum / *count as f64, decimals)))
            .collect()
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
