//! Plumbing shared by the helpers.

use std::collections::BTreeMap;

use brokerkit_fetch::{BatchResult, RawPayload, RawResponse, fan_out};
use brokerkit_normalize::{Record, normalize_keyed_as};
use brokerkit_types::{BrokerError, Result};
use chrono::{DateTime, Utc};

/// Source of the current instant used to resolve relative ranges.
pub type Clock = fn() -> DateTime<Utc>;

/// Takes the payload filed under `symbol`.
///
/// A single-item or list response is accepted as the symbol's payload.
pub(crate) fn take_symbol(response: RawResponse, symbol: &str) -> Result<RawPayload> {
    match response {
        RawResponse::BySymbol(mut map) => map
            .remove(symbol)
            .ok_or_else(|| BrokerError::no_data(symbol)),
        RawResponse::Item(item) => Ok(RawPayload::One(item)),
        RawResponse::List(items) => Ok(RawPayload::Many(items)),
    }
}

/// Normalizes one record filed under `symbol`.
pub(crate) fn one_record<R: Record>(symbol: &str, payload: RawPayload) -> Result<R> {
    let item = payload.into_one()?;
    Ok(normalize_keyed_as(symbol, &item)?)
}

/// Normalizes every record filed under `symbol`.
pub(crate) fn many_records<R: Record>(symbol: &str, payload: RawPayload) -> Result<Vec<R>> {
    payload
        .into_items()
        .iter()
        .map(|item| normalize_keyed_as(symbol, item).map_err(BrokerError::from))
        .collect()
}

/// Splits a batched response into per-symbol outcomes.
///
/// Every requested symbol lands in the batch: a failed request fails them
/// all with its error, a symbol missing from the response fails with
/// [`BrokerError::NoData`], and a record that does not normalize fails only
/// its own symbol.
pub(crate) fn per_symbol<T>(
    symbols: &[String],
    response: Result<RawResponse>,
    mut convert: impl FnMut(&str, RawPayload) -> Result<T>,
) -> BatchResult<String, T, BrokerError> {
    let mut payloads: BTreeMap<String, RawPayload> =
        match response.and_then(RawResponse::into_by_symbol) {
            Ok(map) => map,
            Err(err) => return fan_out(symbols, |_| Err(err.clone())),
        };

    fan_out(symbols, |symbol| {
        let payload = payloads
            .remove(symbol)
            .ok_or_else(|| BrokerError::no_data(symbol))?;
        convert(symbol, payload)
    })
}
