use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::Timestamp;

pub const ID_KEY: &str = "id";
pub const ESTIMATE_KEY: &str = "estimate";
pub const URL_KEY: &str = "url";
pub const ENABLED_KEY: &str = "enabled";

/// One row of the watch table: an ordered JSON object as returned by
/// `GET /watch`. Key order is the order the server sent them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchRecord {
    fields: Map<String, Value>,
}

impl WatchRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Identifier as text; numeric and string ids are both accepted.
    pub fn id(&self) -> Option<String> {
        match self.fields.get(ID_KEY)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One sample of a watch's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
    #[serde(default)]
    pub url: Option<String>,
}

impl PricePoint {
    pub fn timestamp_ms(&self) -> Timestamp {
        self.date.timestamp_millis()
    }

    /// Lenient conversion from a series entry: `date` may be RFC 3339, a naive
    /// date-time or a bare date; `price` may be a number or a numeric string.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, ViewError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ViewError::malformed(index, "expected an object"))?;
        let date = obj
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .ok_or_else(|| ViewError::malformed(index, "missing or invalid date"))?;
        let price = obj
            .get("price")
            .and_then(number_of)
            .filter(|p| p.is_finite())
            .ok_or_else(|| ViewError::malformed(index, "missing or invalid price"))?;
        let url = obj
            .get(URL_KEY)
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Ok(Self { date, price, url })
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

/// Numbers, or strings that parse as one.
pub(crate) fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Result of a lenient parse: the usable items plus what was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub items: Vec<T>,
    pub issues: Vec<ViewError>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Non-object entries become empty records so the row count still matches
/// the response.
pub fn parse_records(values: Vec<Value>) -> Parsed<WatchRecord> {
    let mut parsed = Parsed {
        items: Vec::with_capacity(values.len()),
        issues: Vec::new(),
    };
    for (index, value) in values.into_iter().enumerate() {
        match value {
            Value::Object(fields) => parsed.items.push(WatchRecord::new(fields)),
            _ => {
                parsed
                    .issues
                    .push(ViewError::malformed(index, "expected an object"));
                parsed.items.push(WatchRecord::default());
            }
        }
    }
    parsed
}

/// Points that cannot be placed on the chart are dropped.
pub fn parse_points(values: &[Value]) -> Parsed<PricePoint> {
    let mut parsed = Parsed::default();
    for (index, value) in values.iter().enumerate() {
        match PricePoint::from_value(index, value) {
            Ok(point) => parsed.items.push(point),
            Err(err) => parsed.issues.push(err),
        }
    }
    parsed
}
