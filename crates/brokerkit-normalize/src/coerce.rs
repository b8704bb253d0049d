//! Coercion of raw JSON values into typed field values.

use brokerkit_types::{DomainRecord, NormalizeError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::shape::FieldKind;

/// Naive layouts accepted for timestamps without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// ISO-8601 layouts with a numeric offset that RFC 3339 does not cover.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// A raw value after coercion to its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Float.
    Float(f64),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Boolean.
    Bool(bool),
    /// String.
    Text(String),
    /// Instant in UTC.
    Timestamp(DateTime<Utc>),
    /// UUID.
    Uuid(Uuid),
    /// List of strings.
    TextList(Vec<String>),
    /// List of floats.
    FloatList(Vec<f64>),
    /// List of floats with gaps.
    OptFloatList(Vec<Option<f64>>),
    /// List of instants.
    TimestampList(Vec<DateTime<Utc>>),
    /// Nested normalized record.
    Record(DomainRecord),
}

impl FieldValue {
    /// Returns the kind name of the value.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "integer",
            Self::UInt(_) => "unsigned integer",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "string",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::TextList(_) => "string list",
            Self::FloatList(_) | Self::OptFloatList(_) => "number list",
            Self::TimestampList(_) => "timestamp list",
            Self::Record(record) => record.shape_name(),
        }
    }
}

/// Coerces a non-null raw value to a scalar or list kind.
///
/// Nested kinds are handled by the normalizer, which owns recursion.
///
/// # Errors
///
/// Returns [`NormalizeError::MalformedField`] naming `field` when the value
/// cannot be represented as `kind`.
pub fn coerce(field: &str, kind: FieldKind, value: &Value) -> Result<FieldValue, NormalizeError> {
    let malformed = || NormalizeError::malformed(field, kind.type_name(), value);

    let coerced = match kind {
        FieldKind::Float => to_float(value).map(FieldValue::Float),
        FieldKind::Int => to_int(value).map(FieldValue::Int),
        FieldKind::UInt => to_uint(value).map(FieldValue::UInt),
        FieldKind::Bool => to_bool(value).map(FieldValue::Bool),
        FieldKind::Text | FieldKind::Symbol => value.as_str().map(|s| FieldValue::Text(s.to_string())),
        FieldKind::Timestamp => to_timestamp(value).map(FieldValue::Timestamp),
        FieldKind::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(FieldValue::Uuid),
        FieldKind::TextList => to_text_list(value).map(FieldValue::TextList),
        FieldKind::TextListOf(key) => value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.get(key).and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .map(FieldValue::TextList),
        FieldKind::FloatList => value
            .as_array()
            .and_then(|items| items.iter().map(to_float).collect())
            .map(FieldValue::FloatList),
        FieldKind::OptFloatList => value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| if item.is_null() { Some(None) } else { to_float(item).map(Some) })
                    .collect()
            })
            .map(FieldValue::OptFloatList),
        FieldKind::TimestampList => value
            .as_array()
            .and_then(|items| items.iter().map(to_timestamp).collect())
            .map(FieldValue::TimestampList),
        FieldKind::Nested(_) => None,
    };

    coerced.ok_or_else(malformed)
}

/// Reads a finite float from a JSON number or numeric string.
#[must_use]
pub fn to_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an instant from ISO-8601 text or integer unix seconds.
///
/// Text without an offset is taken as UTC; a bare date is midnight UTC.
#[must_use]
pub fn to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let extended = expand_basic(text);
    let text = extended.as_deref().unwrap_or(text);
    let zoned = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+0000"),
        None => text.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rewrites the basic ISO-8601 layout (`20240301T143000Z`) in extended form.
fn expand_basic(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        bytes.get(range).is_some_and(|b| b.iter().all(u8::is_ascii_digit))
    };
    if !(digits(0..8) && bytes.get(8) == Some(&b'T') && digits(9..15)) {
        return None;
    }
    Some(format!(
        "{}-{}-{}T{}:{}:{}{}",
        &text[0..4],
        &text[4..6],
        &text[6..8],
        &text[9..11],
        &text[11..13],
        &text[13..15],
        &text[15..]
    ))
}

fn to_text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
