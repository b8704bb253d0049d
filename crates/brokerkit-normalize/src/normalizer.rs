//! Entry points mapping raw JSON onto domain records.

use brokerkit_types::{DomainRecord, NormalizeError};
use serde_json::{Map, Value};

use crate::record::{Record, build};
use crate::shape::RecordShape;

/// A raw upstream record: a JSON object with wire-format keys.
pub type RawItem = Map<String, Value>;

/// Normalizes a raw object into the record for `shape`.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingRequiredField`] for the first required
/// field that is absent or null, and [`NormalizeError::MalformedField`] for
/// the first present value that cannot be coerced.
pub fn normalize(raw: &RawItem, shape: RecordShape) -> Result<DomainRecord, NormalizeError> {
    traced(shape, None, build(raw, shape, None))
}

/// Normalizes a raw object that was filed under `key` in a keyed response.
///
/// The key fills the symbol when the object carries none.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_keyed(
    key: &str,
    raw: &RawItem,
    shape: RecordShape,
) -> Result<DomainRecord, NormalizeError> {
    traced(shape, Some(key), build(raw, shape, Some(key)))
}

/// Normalizes any JSON value, rejecting non-objects.
///
/// # Errors
///
/// Returns [`NormalizeError::NotAnObject`] if `value` is not an object, and
/// otherwise the errors of [`normalize`].
pub fn normalize_value(
    value: &Value,
    shape: RecordShape,
    key: Option<&str>,
) -> Result<DomainRecord, NormalizeError> {
    let raw = as_object(value, shape)?;
    traced(shape, key, build(raw, shape, key))
}

/// Normalizes a raw object into a concrete record type.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_as<R: Record>(raw: &RawItem) -> Result<R, NormalizeError> {
    traced(R::SHAPE, None, R::from_raw(raw, None))
}

/// Normalizes a keyed raw object into a concrete record type.
///
/// # Errors
///
/// See [`normalize`].
pub fn normalize_keyed_as<R: Record>(key: &str, raw: &RawItem) -> Result<R, NormalizeError> {
    traced(R::SHAPE, Some(key), R::from_raw(raw, Some(key)))
}

/// Normalizes any JSON value into a concrete record type.
///
/// # Errors
///
/// See [`normalize_value`].
pub fn normalize_value_as<R: Record>(value: &Value, key: Option<&str>) -> Result<R, NormalizeError> {
    let raw = as_object(value, R::SHAPE)?;
    traced(R::SHAPE, key, R::from_raw(raw, key))
}

/// Normalizes every element of a list, stopping at the first failure.
///
/// # Errors
///
/// Returns the first element's error; see [`normalize_value`].
pub fn normalize_list_as<R: Record>(
    values: &[Value],
    key: Option<&str>,
) -> Result<Vec<R>, NormalizeError> {
    values
        .iter()
        .map(|value| normalize_value_as(value, key))
        .collect()
}

fn as_object(value: &Value, shape: RecordShape) -> Result<&RawItem, NormalizeError> {
    value.as_object().ok_or_else(|| NormalizeError::NotAnObject {
        shape: shape.name(),
        value: value.to_string(),
    })
}

fn traced<T>(
    shape: RecordShape,
    key: Option<&str>,
    result: Result<T, NormalizeError>,
) -> Result<T, NormalizeError> {
    if let Err(err) = &result {
        tracing::debug!(%shape, key, error = %err, "raw record rejected");
    }
    result
}
