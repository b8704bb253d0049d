//! Option snapshot and chain helper.

use brokerkit_fetch::{BatchResult, Endpoint, RawClient, RawRequest, RawResponse, distinct_symbols};
use brokerkit_normalize::normalize_keyed_as;
use brokerkit_types::{BrokerError, OptionKind, OptionRecord, Result};
use chrono::NaiveDate;

use crate::config::HelperConfig;
use crate::support::{one_record, per_symbol, take_symbol};

/// Option snapshots, single contracts and chains.
#[derive(Debug, Clone)]
pub struct OptionHelper<C> {
    client: C,
    config: HelperConfig,
}

impl<C: RawClient> OptionHelper<C> {
    /// Creates the helper.
    pub const fn new(client: C, config: HelperConfig) -> Self {
        Self { client, config }
    }

    /// Snapshot of one contract, `None` if the upstream has nothing for it.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn option(&self, symbol: &str) -> Result<Option<OptionRecord>> {
        let request = RawRequest::new(Endpoint::OptionSnapshots).with_symbol(symbol);
        let response = self.submit(&request)?;
        match take_symbol(response, symbol) {
            Ok(payload) => one_record(symbol, payload).map(Some),
            Err(BrokerError::NoData { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Snapshots of several contracts in one request.
    pub fn options<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> BatchResult<String, OptionRecord, BrokerError> {
        let symbols = distinct_symbols(symbols);
        let request =
            RawRequest::new(Endpoint::OptionSnapshots).with_symbols(symbols.iter().cloned());
        per_symbol(&symbols, self.submit(&request), one_record)
    }

    /// Every contract of `underlying`, optionally restricted to one expiration.
    ///
    /// Contracts come back in OCC symbol order, which sorts by expiration,
    /// then call before put, then strike. With an expiration filter,
    /// contracts whose symbol does not decode are dropped.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn chain(
        &self,
        underlying: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<Vec<OptionRecord>> {
        let mut request = RawRequest::new(Endpoint::OptionChain)
            .with_symbol(underlying)
            .with_param("feed", self.feed());
        if let Some(date) = expiration {
            request = request.with_param("expiration_date", date.format("%Y-%m-%d"));
        }

        let contracts = self.submit(&request)?.into_by_symbol()?;
        let mut records = Vec::with_capacity(contracts.len());
        for (symbol, payload) in contracts {
            let item = payload.into_one()?;
            let record: OptionRecord = normalize_keyed_as(&symbol, &item)?;
            if expiration.is_none_or(|date| record.expiration() == Some(date)) {
                records.push(record);
            }
        }

        tracing::debug!(underlying, contracts = records.len(), "option chain loaded");
        Ok(records)
    }

    /// Calls from a chain, sorted by strike.
    ///
    /// # Errors
    ///
    /// See [`Self::chain`].
    pub fn calls(&self, underlying: &str, expiration: Option<NaiveDate>) -> Result<Vec<OptionRecord>> {
        self.side(underlying, expiration, OptionKind::Call)
    }

    /// Puts from a chain, sorted by strike.
    ///
    /// # Errors
    ///
    /// See [`Self::chain`].
    pub fn puts(&self, underlying: &str, expiration: Option<NaiveDate>) -> Result<Vec<OptionRecord>> {
        self.side(underlying, expiration, OptionKind::Put)
    }

    fn side(
        &self,
        underlying: &str,
        expiration: Option<NaiveDate>,
        kind: OptionKind,
    ) -> Result<Vec<OptionRecord>> {
        let mut records: Vec<_> = self
            .chain(underlying, expiration)?
            .into_iter()
            .filter(|record| record.kind() == Some(kind))
            .collect();
        records.sort_by(|a, b| {
            (a.expiration(), a.strike())
                .partial_cmp(&(b.expiration(), b.strike()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(records)
    }

    /// Option feed: consolidated when the stock feed is, indicative otherwise.
    const fn feed(&self) -> &'static str {
        match self.config.feed {
            crate::config::DataFeed::Sip => "opra",
            _ => "indicative",
        }
    }

    fn submit(&self, request: &RawRequest) -> Result<RawResponse> {
        tracing::debug!(endpoint = %request.endpoint, symbols = request.symbols.len(), "submitting option request");
        Ok(self.client.submit(request)?)
    }
}
