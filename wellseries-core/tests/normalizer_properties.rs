//! Property tests for timestamp normalization and regularization

mod common;

use chrono::{Duration, NaiveTime, Timelike};
use proptest::prelude::*;

use wellseries_core::{
    time::default_base_date, FieldValue, Normalized, Normalizer, NormalizerConfig, RawRecord, Regularizer,
};

use common::{assert_complete, assert_minute_spaced, at};

fn text(s: String) -> FieldValue {
    FieldValue::Text(s)
}

proptest! {
    #[test]
    fn day_offset_date_is_base_plus_n_minus_one(
        n in 1u32..5000,
        hour in 0u32..24,
        minute in 0u32..60,
        sep in prop::sample::select(vec!["", "-", "_", " "]),
        upper in any::<bool>(),
    ) {
        let prefix = if upper { "DAY" } else { "day" };
        let raw = format!("{prefix}{sep}{n} {hour:02}:{minute:02}:00");

        let mut normalizer = Normalizer::default();
        let at = normalizer.normalize(&text(raw)).at().expect("day offset resolves");

        prop_assert_eq!(at.date(), default_base_date() + Duration::days(i64::from(n) - 1));
        prop_assert_eq!(at.time(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    }

    #[test]
    fn bare_times_never_go_backwards(times in prop::collection::vec((0u32..24, 0u32..60, 0u32..60), 1..200)) {
        let mut normalizer = Normalizer::default();
        let mut previous = None;

        for (h, m, s) in times {
            let at = normalizer
                .normalize(&text(format!("{h:02}:{m:02}:{s:02}")))
                .at()
                .expect("time of day resolves");
            if let Some(prev) = previous {
                prop_assert!(at > prev, "{} did not move past {}", at, prev);
            }
            prop_assert_eq!((at.hour(), at.minute(), at.second()), (h, m, s));
            previous = Some(at);
        }
    }

    #[test]
    fn epoch_seconds_and_millis_agree(secs in 946_684_800i64..4_102_444_800) {
        let mut normalizer = Normalizer::new(NormalizerConfig::default());
        let from_secs = normalizer.normalize(&FieldValue::Number(secs as f64)).at();
        let from_millis = normalizer.normalize(&FieldValue::Number(secs as f64 * 1000.0)).at();
        prop_assert!(from_secs.is_some());
        prop_assert_eq!(from_secs, from_millis);
    }

    #[test]
    fn garbage_is_rejected_not_panicking(s in "[a-zA-Z !?#]{0,20}") {
        let mut normalizer = Normalizer::default();
        let outcome = normalizer.normalize(&text(s));
        prop_assert!(matches!(outcome, Normalized::Rejected(_)));
        prop_assert_eq!(normalizer.last_resolved(), None);
    }

    #[test]
    fn regularized_series_is_dense(
        offsets in prop::collection::btree_set(0i64..500, 1..60),
        nulls in prop::collection::vec(any::<bool>(), 60),
    ) {
        let start = at("2024-01-01T00:00:00");
        let rows: Vec<RawRecord> = offsets
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let ts = (start + Duration::minutes(*m)).format("%Y-%m-%dT%H:%M:%S").to_string();
                let value = if nulls[i] && i > 0 { None } else { Some(*m as f64) };
                RawRecord::new().with("timestamp", ts.as_str()).with("P-PDG", value)
            })
            .collect();

        let batch = Normalizer::default().normalize_batch(rows);
        let out = Regularizer::default().regularize(&batch.records);

        let first = *offsets.iter().next().unwrap();
        let last = *offsets.iter().next_back().unwrap();
        prop_assert_eq!(out.records.len() as i64, last - first + 1);
        assert_minute_spaced(&out.records);
        assert_complete(&out.records);
        prop_assert!(out.records.iter().all(|r| r.sensors.contains_key("p_pdg")));
    }
}
