//! Coerced field values of one raw record, keyed by target name.

use std::collections::HashMap;

use brokerkit_types::{
    BarRecord, DomainRecord, GreeksRecord, NormalizeError, QuoteRecord, TradeRecord,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::coerce::{FieldValue, coerce};
use crate::shape::{FieldKind, RecordShape};

/// Conversion from a coerced [`FieldValue`] into a concrete Rust type.
pub trait FromFieldValue: Sized {
    /// Type name used when the value has a different kind.
    const EXPECTED: &'static str;

    /// Extracts `Self`, or `None` if the value holds a different kind.
    fn from_field_value(value: FieldValue) -> Option<Self>;
}

macro_rules! from_field_value {
    ($($ty:ty => $variant:ident, $expected:literal;)*) => {
        $(
            impl FromFieldValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_field_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_field_value! {
    f64 => Float, "float";
    i64 => Int, "integer";
    u64 => UInt, "unsigned integer";
    bool => Bool, "boolean";
    String => Text, "string";
    DateTime<Utc> => Timestamp, "timestamp";
    Uuid => Uuid, "uuid";
    Vec<String> => TextList, "string list";
    Vec<f64> => FloatList, "number list";
    Vec<Option<f64>> => OptFloatList, "number list";
    Vec<DateTime<Utc>> => TimestampList, "timestamp list";
}

macro_rules! from_nested_record {
    ($($ty:ty => $variant:ident, $expected:literal;)*) => {
        $(
            impl FromFieldValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_field_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Record(DomainRecord::$variant(inner)) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_nested_record! {
    BarRecord => Bar, "bar";
    QuoteRecord => Quote, "quote";
    TradeRecord => Trade, "trade";
    GreeksRecord => Greeks, "greeks";
}

/// Field values extracted from one raw record.
#[derive(Debug, Clone)]
pub struct Fields {
    shape: RecordShape,
    values: HashMap<&'static str, FieldValue>,
}

impl Fields {
    /// Walks the shape's table over `raw`, coercing every present field.
    ///
    /// `key` is the symbol the item was filed under in a keyed response. It
    /// fills [`FieldKind::Symbol`] slots the item leaves empty and is handed
    /// down to nested records.
    ///
    /// # Errors
    ///
    /// Fails on the first required field that is absent and on the first
    /// present field whose value cannot be coerced.
    pub fn collect(
        raw: &Map<String, Value>,
        shape: RecordShape,
        key: Option<&str>,
    ) -> Result<Self, NormalizeError> {
        let mut values = HashMap::with_capacity(shape.fields().len());

        for spec in shape.fields() {
            let raw_value = raw.get(spec.source).filter(|v| !v.is_null());

            let value = match (raw_value, spec.kind) {
                (None, FieldKind::Symbol) => key.map(|k| FieldValue::Text(k.to_string())),
                (None, _) => None,
                (Some(v), FieldKind::Nested(inner)) => {
                    nested(spec.source, v, inner, key)?.map(FieldValue::Record)
                }
                (Some(v), kind) => Some(coerce(spec.source, kind, v)?),
            };

            match value {
                Some(value) => {
                    values.insert(spec.target, value);
                }
                None if spec.required => return Err(NormalizeError::missing(spec.source)),
                None => {}
            }
        }

        Ok(Self { shape, values })
    }

    /// Returns the shape the values were collected for.
    #[must_use]
    pub const fn shape(&self) -> RecordShape {
        self.shape
    }

    /// Returns true if a value is present for `target`.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.values.contains_key(target)
    }

    /// Takes a value that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MissingRequiredField`] if the value is absent
    /// and [`NormalizeError::MalformedField`] if it holds another kind.
    pub fn required<T: FromFieldValue>(&mut self, target: &str) -> Result<T, NormalizeError> {
        self.optional(target)?
            .ok_or_else(|| NormalizeError::missing(self.source_of(target)))
    }

    /// Takes a value that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MalformedField`] if the value holds another
    /// kind than `T`.
    pub fn optional<T: FromFieldValue>(&mut self, target: &str) -> Result<Option<T>, NormalizeError> {
        let Some(value) = self.values.remove(target) else {
            return Ok(None);
        };
        let found = value.kind_name();
        T::from_field_value(value)
            .map(Some)
            .ok_or_else(|| NormalizeError::MalformedField {
                field: self.source_of(target).to_string(),
                expected: T::EXPECTED,
                value: found.to_string(),
            })
    }

    fn source_of<'a>(&self, target: &'a str) -> &'a str {
        self.shape.field(target).map_or(target, |spec| spec.source)
    }
}

/// Normalizes a nested object. An empty object counts as absent.
fn nested(
    source: &str,
    value: &Value,
    shape: RecordShape,
    key: Option<&str>,
) -> Result<Option<DomainRecord>, NormalizeError> {
    let Some(object) = value.as_object() else {
        return Err(NormalizeError::malformed(source, shape.name(), value));
    };
    if object.is_empty() {
        return Ok(None);
    }
    crate::record::build(object, shape, key)
        .map(Some)
        .map_err(|err| prefixed(source, err))
}

/// Qualifies a nested error's field with the parent slot, e.g. `latestQuote.bp`.
fn prefixed(parent: &str, err: NormalizeError) -> NormalizeError {
    match err {
        NormalizeError::MalformedField {
            field,
            expected,
            value,
        } => NormalizeError::MalformedField {
            field: format!("{parent}.{field}"),
            expected,
            value,
        },
        NormalizeError::MissingRequiredField { field } => {
            NormalizeError::missing(format!("{parent}.{field}"))
        }
        other @ NormalizeError::NotAnObject { .. } => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture must be an object"),
        }
    }

    #[test]
    fn test_required_and_optional() {
        let raw = object(json!({"S": "AAPL", "t": "2024-01-02T14:30:00Z", "o": 1, "h": 2, "l": 0.5, "c": "1.5", "v": 100}));
        let mut fields = Fields::collect(&raw, RecordShape::Bar, None).unwrap();
        assert_eq!(fields.shape(), RecordShape::Bar);
        assert!(fields.contains("close"));
        assert!(!fields.contains("vwap"));
        assert_eq!(fields.required::<f64>("close").unwrap(), 1.5);
        assert_eq!(fields.optional::<f64>("vwap").unwrap(), None);
    }

    #[test]
    fn test_missing_uses_source_name() {
        let raw = object(json!({"S": "AAPL", "o": 1, "h": 2, "l": 0.5, "c": 1.5, "v": 100}));
        let err = Fields::collect(&raw, RecordShape::Bar, None).unwrap_err();
        assert_eq!(err, NormalizeError::missing("t"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let raw = object(json!({"S": "AAPL", "t": null, "o": 1, "h": 2, "l": 0.5, "c": 1.5, "v": 100}));
        assert_eq!(
            Fields::collect(&raw, RecordShape::Bar, None).unwrap_err(),
            NormalizeError::missing("t")
        );
    }

    #[test]
    fn test_wrong_kind_is_malformed() {
        let raw = object(json!({"S": "AAPL", "t": "2024-01-02T14:30:00Z", "o": 1, "h": 2, "l": 0.5, "c": 1.5, "v": 100}));
        let mut fields = Fields::collect(&raw, RecordShape::Bar, None).unwrap();
        let err = fields.required::<String>("open").unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MalformedField { ref field, expected: "string", .. } if field == "o"
        ));
    }

    #[test]
    fn test_symbol_falls_back_to_key() {
        let raw = object(json!({"t": "2024-01-02T14:30:00Z", "o": 1, "h": 2, "l": 0.5, "c": 1.5, "v": 100}));
        assert_eq!(
            Fields::collect(&raw, RecordShape::Bar, None).unwrap_err(),
            NormalizeError::missing("S")
        );
        let mut fields = Fields::collect(&raw, RecordShape::Bar, Some("MSFT")).unwrap();
        assert_eq!(fields.required::<String>("symbol").unwrap(), "MSFT");
    }

    #[test]
    fn test_nested_errors_are_qualified() {
        let raw = object(json!({"symbol": "AAPL", "latestQuote": {"t": "2024-01-02T14:30:00Z", "bp": "abc", "bs": 1, "ap": 2, "as": 1}}));
        let err = Fields::collect(&raw, RecordShape::Snapshot, None).unwrap_err();
        assert_eq!(err.field(), Some("latestQuote.bp"));
    }

    #[test]
    fn test_nested_non_object_is_malformed() {
        let raw = object(json!({"symbol": "AAPL", "dailyBar": [1, 2, 3]}));
        let err = Fields::collect(&raw, RecordShape::Snapshot, None).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MalformedField { ref field, expected: "bar", .. } if field == "dailyBar"
        ));
    }
}
