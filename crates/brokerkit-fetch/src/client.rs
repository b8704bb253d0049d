//! Raw client contract and the request/response envelopes it exchanges.

use std::collections::BTreeMap;
use std::sync::Arc;

use brokerkit_normalize::RawItem;
use brokerkit_types::{BrokerError, ResolvedRange, TimeframeSpec, TransportError};
use serde_json::Value;

/// Asset class served by the market-data endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    /// US equities.
    Stock,
    /// Crypto pairs such as `BTC/USD`.
    Crypto,
}

impl AssetClass {
    /// Returns the path segment for this asset class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stocks",
            Self::Crypto => "crypto",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream call a [`RawRequest`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Latest quote per symbol.
    LatestQuotes(AssetClass),
    /// Latest bar per symbol.
    LatestBars(AssetClass),
    /// Latest trade per symbol.
    LatestTrades(AssetClass),
    /// Historical bars.
    Bars(AssetClass),
    /// Historical quotes.
    Quotes(AssetClass),
    /// Historical trades.
    Trades(AssetClass),
    /// Snapshots per symbol.
    Snapshots(AssetClass),
    /// Option snapshots for explicit contract symbols.
    OptionSnapshots,
    /// Option snapshots for every contract of an underlying.
    OptionChain,
    /// News articles.
    News,
    /// Account summary.
    Account,
    /// Portfolio equity history.
    PortfolioHistory,
    /// All open positions.
    Positions,
    /// One open position.
    Position,
    /// Orders matching a filter.
    Orders,
    /// One order by id.
    Order,
}

impl Endpoint {
    /// Returns a stable path-like name for logs and mocks.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::LatestQuotes(AssetClass::Stock) => "stocks/quotes/latest",
            Self::LatestQuotes(AssetClass::Crypto) => "crypto/latest/quotes",
            Self::LatestBars(AssetClass::Stock) => "stocks/bars/latest",
            Self::LatestBars(AssetClass::Crypto) => "crypto/latest/bars",
            Self::LatestTrades(AssetClass::Stock) => "stocks/trades/latest",
            Self::LatestTrades(AssetClass::Crypto) => "crypto/latest/trades",
            Self::Bars(AssetClass::Stock) => "stocks/bars",
            Self::Bars(AssetClass::Crypto) => "crypto/bars",
            Self::Quotes(AssetClass::Stock) => "stocks/quotes",
            Self::Quotes(AssetClass::Crypto) => "crypto/quotes",
            Self::Trades(AssetClass::Stock) => "stocks/trades",
            Self::Trades(AssetClass::Crypto) => "crypto/trades",
            Self::Snapshots(AssetClass::Stock) => "stocks/snapshots",
            Self::Snapshots(AssetClass::Crypto) => "crypto/snapshots",
            Self::OptionSnapshots => "options/snapshots",
            Self::OptionChain => "options/snapshots/chain",
            Self::News => "news",
            Self::Account => "account",
            Self::PortfolioHistory => "account/portfolio/history",
            Self::Positions => "positions",
            Self::Position => "positions/symbol",
            Self::Orders => "orders",
            Self::Order => "orders/id",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A request handed to the raw client.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Symbols, in caller order.
    pub symbols: Vec<String>,
    /// Bar interval, for bar endpoints.
    pub timeframe: Option<TimeframeSpec>,
    /// Time window; open bounds are left to the upstream default.
    pub range: ResolvedRange,
    /// Maximum number of records.
    pub limit: Option<u32>,
    /// Endpoint-specific parameters (feed, location, status, ...).
    pub params: BTreeMap<String, String>,
}

impl RawRequest {
    /// Creates a request for `endpoint` with no symbols and an open range.
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            symbols: Vec::new(),
            timeframe: None,
            range: ResolvedRange::OPEN,
            limit: None,
            params: BTreeMap::new(),
        }
    }

    /// Sets the symbols.
    #[must_use]
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a single symbol.
    #[must_use]
    pub fn with_symbol(self, symbol: impl Into<String>) -> Self {
        self.with_symbols([symbol])
    }

    /// Sets the bar interval.
    #[must_use]
    pub const fn with_timeframe(mut self, timeframe: TimeframeSpec) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    /// Sets the time window.
    #[must_use]
    pub const fn with_range(mut self, range: ResolvedRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the record limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Adds an endpoint-specific parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Records filed under one symbol in a keyed response.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// A single record (latest quote, snapshot, ...).
    One(RawItem),
    /// A list of records (bars, trades, ...).
    Many(Vec<RawItem>),
}

impl RawPayload {
    /// Returns the records as a list; a single record becomes a list of one.
    #[must_use]
    pub fn into_items(self) -> Vec<RawItem> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    /// Returns the single record.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnexpectedResponse`] for a list payload.
    pub fn into_one(self) -> Result<RawItem, BrokerError> {
        match self {
            Self::One(item) => Ok(item),
            Self::Many(items) => Err(BrokerError::UnexpectedResponse(format!(
                "expected one record, got a list of {}",
                items.len()
            ))),
        }
    }
}

/// A response from the raw client.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// A single record.
    Item(RawItem),
    /// A flat list of records.
    List(Vec<RawItem>),
    /// Records keyed by symbol.
    BySymbol(BTreeMap<String, RawPayload>),
}

impl RawResponse {
    /// Returns a short name of the layout.
    #[must_use]
    pub const fn layout(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::List(_) => "list",
            Self::BySymbol(_) => "by-symbol",
        }
    }

    /// Returns the single record.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnexpectedResponse`] for any other layout.
    pub fn into_item(self) -> Result<RawItem, BrokerError> {
        match self {
            Self::Item(item) => Ok(item),
            other => Err(unexpected("item", &other)),
        }
    }

    /// Returns the flat list of records.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnexpectedResponse`] for any other layout.
    pub fn into_list(self) -> Result<Vec<RawItem>, BrokerError> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(unexpected("list", &other)),
        }
    }

    /// Returns the records keyed by symbol.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnexpectedResponse`] for any other layout.
    pub fn into_by_symbol(self) -> Result<BTreeMap<String, RawPayload>, BrokerError> {
        match self {
            Self::BySymbol(map) => Ok(map),
            other => Err(unexpected("by-symbol", &other)),
        }
    }

    /// Builds a response from decoded JSON.
    ///
    /// With `keyed`, an object is read as a symbol-to-payload map. Otherwise
    /// an object is one record and an array is a list.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnexpectedResponse`] for scalars, arrays
    /// holding non-objects, and keyed payloads that are neither objects nor
    /// arrays of objects.
    pub fn from_value(value: Value, keyed: bool) -> Result<Self, BrokerError> {
        match value {
            Value::Object(map) if keyed => map
                .into_iter()
                .map(|(symbol, payload)| {
                    let payload = match payload {
                        Value::Object(item) => RawPayload::One(item),
                        Value::Array(items) => RawPayload::Many(objects(items)?),
                        other => {
                            return Err(BrokerError::UnexpectedResponse(format!(
                                "payload for {symbol} is not an object or list: {other}"
                            )));
                        }
                    };
                    Ok((symbol, payload))
                })
                .collect::<Result<_, _>>()
                .map(Self::BySymbol),
            Value::Object(item) => Ok(Self::Item(item)),
            Value::Array(items) => objects(items).map(Self::List),
            other => Err(BrokerError::UnexpectedResponse(format!(
                "expected an object or array, got {other}"
            ))),
        }
    }
}

fn objects(items: Vec<Value>) -> Result<Vec<RawItem>, BrokerError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(BrokerError::UnexpectedResponse(format!(
                "list element is not an object: {other}"
            ))),
        })
        .collect()
}

fn unexpected(wanted: &str, got: &RawResponse) -> BrokerError {
    BrokerError::UnexpectedResponse(format!("expected {wanted} layout, got {}", got.layout()))
}

/// Executes requests against the brokerage.
///
/// Implementations own transport, authentication and pagination. A call is
/// synchronous from the caller's point of view and is never retried here.
pub trait RawClient {
    /// Submits one request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the call fails.
    fn submit(&self, request: &RawRequest) -> Result<RawResponse, TransportError>;
}

impl<C: RawClient + ?Sized> RawClient for &C {
    fn submit(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        (**self).submit(request)
    }
}

impl<C: RawClient + ?Sized> RawClient for Arc<C> {
    fn submit(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        (**self).submit(request)
    }
}

impl<C: RawClient + ?Sized> RawClient for Box<C> {
    fn submit(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        (**self).submit(request)
    }
}
