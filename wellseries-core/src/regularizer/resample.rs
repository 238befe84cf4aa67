//! Full-range resampling onto the one-minute grid
//!
//! ```text
//! input   00:01  00:02        00:05
//! grid    00:01  00:02  00:03  00:04  00:05
//!                       ^^^^^  ^^^^^  gap slots
//! ```
//!
//! Gap slots take `well_id`/`class` by forward-then-backward fill and sensor
//! values by interpolation, whatever band the column was imputed with.

use std::{collections::BTreeMap, ops::Range};

use crate::{
    errors::SpanError,
    time::{cadence, AbsoluteTime},
};

use super::impute::{forward_backward_fill, interpolate};

/// Column-oriented series, one entry per timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFrame {
    /// Strictly increasing timestamps
    pub times: Vec<AbsoluteTime>,
    /// Well id per row
    pub well_ids: Vec<Option<i64>>,
    /// Class per row
    pub classes: Vec<Option<i64>>,
    /// Sensor columns
    pub sensors: BTreeMap<String, Vec<Option<f64>>>,
}

impl SeriesFrame {
    /// Row count
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True for an empty frame
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Widest run of ascending `times` whose span fits in `max_span_minutes`
///
/// Ties go to the earliest run. Rows outside the returned range are the
/// outliers a regularized series cannot cover.
pub fn densest_window(times: &[AbsoluteTime], max_span_minutes: i64) -> Range<usize> {
    let max = max_span_minutes.max(0);
    let mut best = 0..times.len().min(1);
    let mut lo = 0;
    for hi in 0..times.len() {
        while (times[hi] - times[lo]).num_minutes() > max {
            lo += 1;
        }
        if hi + 1 - lo > best.len() {
            best = lo..hi + 1;
        }
    }
    best
}

/// Reindex a minute-aligned, strictly increasing frame onto every minute
/// between its first and last timestamp
///
/// Returns the resampled frame and the number of slots inserted, or
/// [`SpanError`] when the frame spans more than `max_span_minutes`.
pub fn resample(frame: &SeriesFrame, max_span_minutes: i64) -> Result<(SeriesFrame, usize), SpanError> {
    let (Some(&start), Some(&end)) = (frame.times.first(), frame.times.last()) else {
        return Ok((SeriesFrame::default(), 0));
    };

    let step = cadence();
    let span = SpanError { minutes: (end - start).num_minutes(), max: max_span_minutes };
    if span.minutes > max_span_minutes {
        return Err(span);
    }
    let slot_of = |at: AbsoluteTime| usize::try_from((at - start).num_seconds() / step.num_seconds()).ok();
    let slots = slot_of(end).and_then(|last| last.checked_add(1)).ok_or(span)?;

    let times: Vec<AbsoluteTime> = std::iter::successors(Some(start), |t| t.checked_add_signed(step))
        .take(slots)
        .collect();
    if times.len() != slots {
        return Err(span);
    }

    let mut out = SeriesFrame {
        times,
        well_ids: vec![None; slots],
        classes: vec![None; slots],
        sensors: frame
            .sensors
            .keys()
            .map(|name| (name.clone(), vec![None; slots]))
            .collect(),
    };

    for (row, at) in frame.times.iter().enumerate() {
        let slot = slot_of(*at).filter(|s| *s < slots).ok_or(span)?;
        out.well_ids[slot] = frame.well_ids[row];
        out.classes[slot] = frame.classes[row];
        for (name, column) in &frame.sensors {
            if let Some(target) = out.sensors.get_mut(name) {
                target[slot] = column[row];
            }
        }
    }

    forward_backward_fill(&mut out.well_ids);
    forward_backward_fill(&mut out.classes);
    for column in out.sensors.values_mut() {
        interpolate(column);
    }

    let inserted = slots.saturating_sub(frame.len());
    Ok((out, inserted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::time::MAX_SPAN_MINUTES, time::parse_naive_iso};

    fn ts(s: &str) -> AbsoluteTime {
        parse_naive_iso(s).unwrap()
    }

    #[test]
    fn fills_gaps_between_rows() {
        let frame = SeriesFrame {
            times: vec![ts("2024-01-01T00:01:00"), ts("2024-01-01T00:02:00"), ts("2024-01-01T00:05:00")],
            well_ids: vec![Some(1), Some(1), Some(1)],
            classes: vec![Some(0), Some(0), Some(4)],
            sensors: BTreeMap::from([("p_pdg".to_string(), vec![Some(10.0), Some(20.0), Some(50.0)])]),
        };

        let (out, inserted) = resample(&frame, MAX_SPAN_MINUTES).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(out.len(), 5);
        assert_eq!(out.times[2], ts("2024-01-01T00:03:00"));
        assert_eq!(out.classes, vec![Some(0), Some(0), Some(0), Some(0), Some(4)]);
        assert_eq!(out.sensors["p_pdg"], vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(50.0)]);
    }

    #[test]
    fn contiguous_frame_is_unchanged() {
        let frame = SeriesFrame {
            times: vec![ts("2024-01-01T00:01:00"), ts("2024-01-01T00:02:00")],
            well_ids: vec![Some(2), Some(2)],
            classes: vec![Some(1), Some(1)],
            sensors: BTreeMap::from([("qgl".to_string(), vec![Some(1.5), Some(2.5)])]),
        };
        let (out, inserted) = resample(&frame, MAX_SPAN_MINUTES).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(out, frame);
    }

    #[test]
    fn empty_frame() {
        let (out, inserted) = resample(&SeriesFrame::default(), MAX_SPAN_MINUTES).unwrap();
        assert!(out.is_empty());
        assert_eq!(inserted, 0);
    }

    #[test]
    fn refuses_span_wider_than_allowed() {
        let frame = SeriesFrame {
            times: vec![ts("2024-01-01T00:00:00"), ts("2603-10-11T11:33:00")],
            well_ids: vec![Some(1), Some(1)],
            classes: vec![Some(0), Some(0)],
            sensors: BTreeMap::new(),
        };
        let err = resample(&frame, MAX_SPAN_MINUTES).unwrap_err();
        assert_eq!(err.max, MAX_SPAN_MINUTES);
        assert!(err.minutes > MAX_SPAN_MINUTES);
    }

    #[test]
    fn densest_window_skips_outliers() {
        let times = vec![
            ts("1999-12-31T23:00:00"),
            ts("2024-01-01T00:00:00"),
            ts("2024-01-01T00:01:00"),
            ts("2024-01-01T00:05:00"),
            ts("2603-10-11T11:33:00"),
        ];
        assert_eq!(densest_window(&times, 10), 1..4);
        assert_eq!(densest_window(&times, 4), 1..3);
        assert_eq!(densest_window(&times[..1], 0), 0..1);
        assert_eq!(densest_window(&[], 10), 0..0);
    }
}
