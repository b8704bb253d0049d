//! Stock and crypto market-data helpers.

use std::ops::Deref;

use brokerkit_fetch::{AssetClass, BatchResult, Endpoint, RawClient, RawRequest, distinct_symbols};
use brokerkit_types::{
    BarRecord, BrokerError, QuoteRecord, RangeQuery, Result, SnapshotRecord, TimeframeSpec,
    TradeRecord,
};
use chrono::Utc;

use crate::config::HelperConfig;
use crate::support::{Clock, many_records, one_record, per_symbol, take_symbol};

/// Parameters for historical bar requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsQuery {
    /// Timeframe code such as `1D`, `15Min` or `4H`.
    pub timeframe: String,
    /// Time window.
    pub range: RangeQuery,
    /// Maximum number of bars per symbol.
    pub limit: Option<u32>,
}

impl Default for BarsQuery {
    fn default() -> Self {
        Self {
            timeframe: "1D".to_string(),
            range: RangeQuery::default(),
            limit: None,
        }
    }
}

impl BarsQuery {
    /// Creates a daily bar query with an open range.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeframe code.
    #[must_use]
    pub fn timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = timeframe.into();
        self
    }

    /// Sets the time window.
    #[must_use]
    pub fn range(mut self, range: RangeQuery) -> Self {
        self.range = range;
        self
    }

    /// Looks back `days` from now.
    #[must_use]
    pub fn days_back(mut self, days: u32) -> Self {
        self.range = self.range.days_back(days);
        self
    }

    /// Sets the bar limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Parameters for historical quote and trade requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicksQuery {
    /// Time window.
    pub range: RangeQuery,
    /// Maximum number of records.
    pub limit: Option<u32>,
}

impl TicksQuery {
    /// Creates a query with an open range.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time window.
    #[must_use]
    pub fn range(mut self, range: RangeQuery) -> Self {
        self.range = range;
        self
    }

    /// Sets the record limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Market-data calls shared by the stock and crypto helpers.
#[derive(Debug, Clone)]
pub struct MarketDataHelper<C> {
    client: C,
    config: HelperConfig,
    class: AssetClass,
    clock: Clock,
}

impl<C: RawClient> MarketDataHelper<C> {
    /// Creates a helper for one asset class.
    pub fn new(client: C, config: HelperConfig, class: AssetClass) -> Self {
        Self {
            client,
            config,
            class,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to resolve relative ranges.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the asset class.
    #[must_use]
    pub const fn asset_class(&self) -> AssetClass {
        self.class
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Latest quote for one symbol.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors; returns
    /// [`BrokerError::NoData`] if the symbol is absent from the response.
    pub fn latest_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        self.latest(Endpoint::LatestQuotes(self.class), symbol)
    }

    /// Latest quotes for several symbols.
    pub fn latest_quotes<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> BatchResult<String, QuoteRecord, BrokerError> {
        self.latest_many(Endpoint::LatestQuotes(self.class), symbols)
    }

    /// Latest bar for one symbol.
    ///
    /// # Errors
    ///
    /// See [`Self::latest_quote`].
    pub fn latest_bar(&self, symbol: &str) -> Result<BarRecord> {
        self.latest(Endpoint::LatestBars(self.class), symbol)
    }

    /// Latest bars for several symbols.
    pub fn latest_bars<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> BatchResult<String, BarRecord, BrokerError> {
        self.latest_many(Endpoint::LatestBars(self.class), symbols)
    }

    /// Latest trade for one symbol.
    ///
    /// # Errors
    ///
    /// See [`Self::latest_quote`].
    pub fn latest_trade(&self, symbol: &str) -> Result<TradeRecord> {
        self.latest(Endpoint::LatestTrades(self.class), symbol)
    }

    /// Latest trades for several symbols.
    pub fn latest_trades<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> BatchResult<String, TradeRecord, BrokerError> {
        self.latest_many(Endpoint::LatestTrades(self.class), symbols)
    }

    /// Snapshot for one symbol.
    ///
    /// # Errors
    ///
    /// See [`Self::latest_quote`].
    pub fn snapshot(&self, symbol: &str) -> Result<SnapshotRecord> {
        self.latest(Endpoint::Snapshots(self.class), symbol)
    }

    /// Snapshots for several symbols.
    pub fn snapshots<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> BatchResult<String, SnapshotRecord, BrokerError> {
        self.latest_many(Endpoint::Snapshots(self.class), symbols)
    }

    /// Historical bars for one symbol, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidTimeframe`] before any call is made if
    /// the timeframe code does not parse, and otherwise propagates transport
    /// and normalization errors.
    pub fn bars(&self, symbol: &str, query: &BarsQuery) -> Result<Vec<BarRecord>> {
        let request = self.bars_request([symbol], query)?;
        let response = self.submit(&request)?;
        many_records(symbol, take_symbol(response, symbol)?)
    }

    /// Historical bars for several symbols in one request.
    ///
    /// # Errors
    ///
    /// Only an invalid timeframe fails the whole call; every other failure
    /// is recorded per symbol.
    pub fn bars_multi<S: AsRef<str>>(
        &self,
        symbols: &[S],
        query: &BarsQuery,
    ) -> Result<BatchResult<String, Vec<BarRecord>, BrokerError>> {
        let symbols = distinct_symbols(symbols);
        let request = self.bars_request(&symbols, query)?;
        let response = self.submit(&request);
        Ok(per_symbol(&symbols, response, many_records))
    }

    /// Historical quotes for one symbol.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn quotes(&self, symbol: &str, query: &TicksQuery) -> Result<Vec<QuoteRecord>> {
        self.ticks(Endpoint::Quotes(self.class), symbol, query)
    }

    /// Historical trades for one symbol.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn trades(&self, symbol: &str, query: &TicksQuery) -> Result<Vec<TradeRecord>> {
        self.ticks(Endpoint::Trades(self.class), symbol, query)
    }

    fn ticks<R: brokerkit_normalize::Record>(
        &self,
        endpoint: Endpoint,
        symbol: &str,
        query: &TicksQuery,
    ) -> Result<Vec<R>> {
        let request = self
            .request(endpoint)
            .with_symbol(symbol)
            .with_range(query.range.resolve((self.clock)()))
            .with_limit(query.limit);
        let response = self.submit(&request)?;
        many_records(symbol, take_symbol(response, symbol)?)
    }

    fn bars_request<I, S>(&self, symbols: I, query: &BarsQuery) -> Result<RawRequest>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let timeframe = TimeframeSpec::parse(&query.timeframe)?;
        Ok(self
            .request(Endpoint::Bars(self.class))
            .with_symbols(symbols)
            .with_timeframe(timeframe)
            .with_range(query.range.resolve((self.clock)()))
            .with_limit(query.limit))
    }

    fn latest<R: brokerkit_normalize::Record>(&self, endpoint: Endpoint, symbol: &str) -> Result<R> {
        let request = self.request(endpoint).with_symbol(symbol);
        let response = self.submit(&request)?;
        one_record(symbol, take_symbol(response, symbol)?)
    }

    fn latest_many<R: brokerkit_normalize::Record, S: AsRef<str>>(
        &self,
        endpoint: Endpoint,
        symbols: &[S],
    ) -> BatchResult<String, R, BrokerError> {
        let symbols = distinct_symbols(symbols);
        let request = self.request(endpoint).with_symbols(symbols.iter().cloned());
        per_symbol(&symbols, self.submit(&request), one_record)
    }

    /// Base request carrying the venue parameter for the asset class.
    fn request(&self, endpoint: Endpoint) -> RawRequest {
        let request = RawRequest::new(endpoint);
        match self.class {
            AssetClass::Stock => request.with_param("feed", self.config.feed),
            AssetClass::Crypto => request.with_param("loc", &self.config.crypto_location),
        }
    }

    fn submit(&self, request: &RawRequest) -> Result<brokerkit_fetch::RawResponse> {
        tracing::debug!(
            endpoint = %request.endpoint,
            symbols = request.symbols.len(),
            start = ?request.range.start,
            end = ?request.range.end,
            "submitting market-data request"
        );
        Ok(self.client.submit(request)?)
    }
}

macro_rules! asset_helper {
    ($(#[$doc:meta])* $name:ident, $class:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name<C>(MarketDataHelper<C>);

        impl<C: RawClient> $name<C> {
            /// Creates the helper.
            pub fn new(client: C, config: HelperConfig) -> Self {
                Self(MarketDataHelper::new(client, config, $class))
            }

            /// Replaces the clock used to resolve relative ranges.
            #[must_use]
            pub fn with_clock(self, clock: Clock) -> Self {
                Self(self.0.with_clock(clock))
            }
        }

        impl<C> Deref for $name<C> {
            type Target = MarketDataHelper<C>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

asset_helper!(
    /// Market data for US equities.
    StockHelper,
    AssetClass::Stock
);

asset_helper!(
    /// Market data for crypto pairs.
    CryptoHelper,
    AssetClass::Crypto
);
