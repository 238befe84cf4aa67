//! Raw and canonical sensor records
//!
//! A [`RawRecord`] is whatever the export contained: a flat map of field names
//! to scalars, with numbers sometimes written as strings and holes written as
//! `null`. A [`CanonicalRecord`] is the cleaned form the query side reads:
//! one well, one minute, every sensor a finite `f64`.
//!
//! ## Field roles
//!
//! Exports name their columns inconsistently, so roles are resolved by alias
//! after [`normalize_field_name`]:
//!
//! ```text
//! "Timesteap"  -> timestamp
//! "Well-ID"    -> well_id
//! "event_id"   -> class
//! "P-PDG"      -> p_pdg (sensor)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    constants::fields::{
        TIMESTAMP_ALIASES, WELL_ID_ALIASES, CLASS_ALIASES, IGNORED_FIELDS,
    },
    errors::Rejection,
    time::{canonical_format, parse_naive_iso, AbsoluteTime},
};

/// One scalar from a raw export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON `null`
    Null,
    /// JSON boolean (never a usable measurement)
    Bool(bool),
    /// JSON number
    Number(f64),
    /// JSON string, possibly holding a number
    Text(String),
}

impl FieldValue {
    /// Numeric view: finite numbers and numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
            FieldValue::Null | FieldValue::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Integer view: numeric values without a fractional part
    pub fn as_i64(&self) -> Option<i64> {
        let value = self.as_f64()?;
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
            Some(value as i64)
        } else {
            None
        }
    }

    /// Null or blank text
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Lower-case a column name and replace separators with underscores
///
/// `"P-MON-CKP"` becomes `"p_mon_ckp"`, `"Well ID"` becomes `"well_id"`.
pub fn normalize_field_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_separator = false;

    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            normalized.extend(ch.to_lowercase());
            last_was_separator = false;
        } else if ch == '_' || ch == '-' || ch == ' ' || ch == '.' || ch == '/' {
            if !last_was_separator {
                normalized.push('_');
            }
            last_was_separator = true;
        }
    }

    normalized
}

/// Role a raw column plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Raw timestamp
    Timestamp,
    /// Well identifier
    WellId,
    /// Class / event code
    Class,
    /// Bookkeeping column from an earlier run
    Ignored,
    /// Measurement
    Sensor,
}

impl FieldRole {
    /// Classify an already-normalized name
    pub fn of(normalized: &str) -> Self {
        if TIMESTAMP_ALIASES.contains(&normalized) {
            FieldRole::Timestamp
        } else if WELL_ID_ALIASES.contains(&normalized) {
            FieldRole::WellId
        } else if CLASS_ALIASES.contains(&normalized) {
            FieldRole::Class
        } else if IGNORED_FIELDS.contains(&normalized) {
            FieldRole::Ignored
        } else {
            FieldRole::Sensor
        }
    }
}

/// Untyped record exactly as loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Field by exact name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// All fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First non-missing value for a role, trying aliases in priority order
    fn role_value(&self, aliases: &[&str]) -> Option<&FieldValue> {
        aliases.iter().find_map(|alias| {
            self.fields
                .iter()
                .find(|(name, value)| normalize_field_name(name) == *alias && !value.is_missing())
                .map(|(_, value)| value)
        })
    }

    /// Raw timestamp value
    pub fn timestamp_value(&self) -> Option<&FieldValue> {
        self.role_value(&TIMESTAMP_ALIASES)
    }

    /// Well id, when present and integral
    pub fn well_id(&self) -> Option<i64> {
        self.role_value(&WELL_ID_ALIASES).and_then(FieldValue::as_i64)
    }

    /// Class code, when present and integral
    pub fn class(&self) -> Option<i64> {
        self.role_value(&CLASS_ALIASES).and_then(FieldValue::as_i64)
    }

    /// Sensor columns as `(normalized name, numeric value)`
    ///
    /// Missing and non-numeric values come back as `None`. If two raw columns
    /// normalize to the same name the first numeric one wins.
    pub fn sensor_values(&self) -> BTreeMap<String, Option<f64>> {
        let mut sensors: BTreeMap<String, Option<f64>> = BTreeMap::new();
        for (name, value) in &self.fields {
            let normalized = normalize_field_name(name);
            if normalized.is_empty() || FieldRole::of(&normalized) != FieldRole::Sensor {
                continue;
            }
            let slot = sensors.entry(normalized).or_insert(None);
            if slot.is_none() {
                *slot = value.as_f64();
            }
        }
        sensors
    }
}

impl FromIterator<(String, FieldValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Why a stored row could not be read back as canonical
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalRecordError {
    /// Timestamp missing or not ISO-8601
    #[error("bad timestamp: {0}")]
    Timestamp(Rejection),
    /// No integral well id
    #[error("missing or non-integer well_id")]
    WellId,
    /// No integral class
    #[error("missing or non-integer class")]
    Class,
}

/// Cleaned reading for one well at one minute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// Minute-aligned timestamp
    #[serde(with = "canonical_format")]
    pub timestamp: AbsoluteTime,
    /// Well identifier
    pub well_id: i64,
    /// Class / event code
    pub class: i64,
    /// Sensor values by lower-snake-case name
    #[serde(flatten)]
    pub sensors: BTreeMap<String, f64>,
}

impl CanonicalRecord {
    /// Record with no sensors
    pub fn new(timestamp: AbsoluteTime, well_id: i64, class: i64) -> Self {
        Self { timestamp, well_id, class, sensors: BTreeMap::new() }
    }

    /// Builder-style sensor insert
    pub fn with_sensor(mut self, name: &str, value: f64) -> Self {
        self.sensors.insert(normalize_field_name(name), value);
        self
    }

    /// Read a stored row back
    ///
    /// The timestamp must be naive ISO-8601 and `well_id`/`class` integral.
    /// Non-numeric extra columns are skipped.
    pub fn from_raw(raw: &RawRecord) -> Result<Self, CanonicalRecordError> {
        let timestamp = match raw.timestamp_value() {
            None => return Err(CanonicalRecordError::Timestamp(Rejection::MissingField)),
            Some(FieldValue::Text(text)) => parse_naive_iso(text)
                .ok_or(CanonicalRecordError::Timestamp(Rejection::Unrecognized))?,
            Some(_) => return Err(CanonicalRecordError::Timestamp(Rejection::Unrecognized)),
        };
        let well_id = raw.well_id().ok_or(CanonicalRecordError::WellId)?;
        let class = raw.class().ok_or(CanonicalRecordError::Class)?;
        let sensors = raw
            .sensor_values()
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        Ok(Self { timestamp, well_id, class, sensors })
    }

    /// Flatten back into a raw record (canonical field names)
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new()
            .with(crate::constants::TIMESTAMP_FIELD, crate::time::format_canonical(&self.timestamp).as_str())
            .with(crate::constants::WELL_ID_FIELD, self.well_id)
            .with(crate::constants::CLASS_FIELD, self.class);
        for (name, value) in &self.sensors {
            raw.insert(name, *value);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_normalize_to_snake_case() {
        assert_eq!(normalize_field_name("P-PDG"), "p_pdg");
        assert_eq!(normalize_field_name("P-MON-CKP"), "p_mon_ckp");
        assert_eq!(normalize_field_name(" Well  ID "), "well_id");
        assert_eq!(normalize_field_name("_old_timestamp"), "_old_timestamp");
        assert_eq!(normalize_field_name("QGL"), "qgl");
    }

    #[test]
    fn roles_resolve_through_aliases() {
        let raw = RawRecord::new()
            .with("Timesteap", "day1 12:01:00 AM")
            .with("WELL", 3_i64)
            .with("event_id", "2")
            .with("P-PDG", "101.5")
            .with("T-TPT", FieldValue::Null)
            .with("original_timestamp", "day1 12:01:00 AM");

        assert_eq!(raw.timestamp_value(), Some(&FieldValue::Text("day1 12:01:00 AM".into())));
        assert_eq!(raw.well_id(), Some(3));
        assert_eq!(raw.class(), Some(2));

        let sensors = raw.sensor_values();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors["p_pdg"], Some(101.5));
        assert_eq!(sensors["t_tpt"], None);
    }

    #[test]
    fn raw_records_deserialize_mixed_scalars() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"Timesteap": "00:02:00", "P-PDG": null, "QGL": "1.5", "flag": true, "class": 0}"#,
        )
        .unwrap();
        assert_eq!(raw.get("P-PDG"), Some(&FieldValue::Null));
        assert_eq!(raw.get("flag"), Some(&FieldValue::Bool(true)));
        assert_eq!(raw.get("QGL").and_then(FieldValue::as_f64), Some(1.5));
        assert_eq!(raw.class(), Some(0));
    }

    #[test]
    fn canonical_serializes_flat() {
        let ts = parse_naive_iso("2024-01-01T00:01:00").unwrap();
        let record = CanonicalRecord::new(ts, 1, 0).with_sensor("P-PDG", 100.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timestamp": "2024-01-01T00:01:00", "well_id": 1, "class": 0, "p_pdg": 100.0})
        );

        let back = CanonicalRecord::from_raw(&serde_json::from_value(json).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn canonical_rejects_rows_without_ids() {
        let raw = RawRecord::new().with("timestamp", "2024-01-01T00:01:00").with("class", 0_i64);
        assert_eq!(CanonicalRecord::from_raw(&raw), Err(CanonicalRecordError::WellId));

        let raw = RawRecord::new().with("well_id", 1_i64).with("class", 0_i64);
        assert_eq!(
            CanonicalRecord::from_raw(&raw),
            Err(CanonicalRecordError::Timestamp(Rejection::MissingField))
        );
    }
}
