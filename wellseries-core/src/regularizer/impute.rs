//! Missing-value imputation
//!
//! Each sensor column is filled independently. The strategy depends on how
//! much of the column is missing; see [`constants::imputation`](crate::constants::imputation)
//! for the bands.
//!
//! All fills operate on time-ordered columns. Interpolation is by row
//! position, so before resampling uneven rows are treated as evenly spaced.
//! On the one-minute grid position and time agree.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::RegularizerConfig;

/// How a column's nulls were filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// No nulls
    Untouched,
    /// Linear by row position, boundaries take the nearest known value
    Interpolate,
    /// Carry previous value forward, then next value backward
    ForwardBackwardFill,
    /// Mean of the same class, then the column mean
    ClassMean,
}

impl ImputationStrategy {
    /// Pick a strategy for a null fraction
    ///
    /// Bands are `[0, 0]`, `(0, interp)`, `[interp, fill)`, `[fill, 1]`.
    pub fn select(null_fraction: f64, config: &RegularizerConfig) -> Self {
        if null_fraction <= 0.0 {
            ImputationStrategy::Untouched
        } else if null_fraction < config.interpolation_max_null_fraction {
            ImputationStrategy::Interpolate
        } else if null_fraction < config.fill_max_null_fraction {
            ImputationStrategy::ForwardBackwardFill
        } else {
            ImputationStrategy::ClassMean
        }
    }
}

/// Fraction of `None` entries, `0.0` for an empty column
pub fn null_fraction<T>(values: &[Option<T>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_none()).count() as f64 / values.len() as f64
}

/// Fill nulls by linear interpolation between neighbouring known rows
///
/// Leading nulls take the first known value, trailing nulls the last one.
/// A column with no known values is left as is.
pub fn interpolate(values: &mut [Option<f64>]) {
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return;
    };

    let first_value = values[first];
    let last_value = values[last];
    for value in &mut values[..first] {
        *value = first_value;
    }
    for value in &mut values[last + 1..] {
        *value = last_value;
    }

    for pair in known.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a < 2 {
            continue;
        }
        let (Some(va), Some(vb)) = (values[a], values[b]) else {
            continue;
        };
        let span = (b - a) as f64;
        for (offset, value) in values[a + 1..b].iter_mut().enumerate() {
            *value = Some(va + (vb - va) * (offset + 1) as f64 / span);
        }
    }
}

/// Carry the last known value forward, then fill any leading run backward
pub fn forward_backward_fill<T: Copy>(values: &mut [Option<T>]) {
    let mut carried = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => carried = Some(*v),
            None => *value = carried,
        }
    }

    let mut carried = None;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => carried = Some(*v),
            None => *value = carried,
        }
    }
}

/// Fill nulls with the mean of non-null values in the same class, then with
/// the column mean for classes that have no values at all
pub fn class_mean_fill(values: &mut [Option<f64>], classes: &[i64]) {
    debug_assert_eq!(values.len(), classes.len());

    let mut per_class: HashMap<i64, (f64, usize)> = HashMap::new();
    let mut total = (0.0, 0usize);
    for (value, class) in values.iter().zip(classes) {
        if let Some(v) = value {
            let entry = per_class.entry(*class).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
            total.0 += v;
            total.1 += 1;
        }
    }

    let global_mean = (total.1 > 0).then(|| total.0 / total.1 as f64);
    for (value, class) in values.iter_mut().zip(classes) {
        if value.is_none() {
            *value = per_class
                .get(class)
                .map(|(sum, count)| sum / *count as f64)
                .or(global_mean);
        }
    }
}

/// Apply the strategy chosen by the column's null fraction
pub fn impute_column(
    classes: &[i64],
    values: &mut [Option<f64>],
    config: &RegularizerConfig,
) -> ImputationStrategy {
    let strategy = ImputationStrategy::select(null_fraction(values), config);
    match strategy {
        ImputationStrategy::Untouched => {}
        ImputationStrategy::Interpolate => interpolate(values),
        ImputationStrategy::ForwardBackwardFill => forward_backward_fill(values),
        ImputationStrategy::ClassMean => class_mean_fill(values, classes),
    }
    strategy
}
