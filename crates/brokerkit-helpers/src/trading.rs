//! Read-only positions and orders helper.

use brokerkit_fetch::{Endpoint, RawClient, RawRequest, RawResponse};
use brokerkit_normalize::normalize_as;
use brokerkit_types::{OrderRecord, PositionRecord, RangeQuery, Result, TransportError};
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::HelperConfig;
use crate::support::Clock;

/// Upstream status for "no such resource".
const NOT_FOUND: u16 = 404;

/// Order status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatusFilter {
    /// Orders still working.
    #[default]
    Open,
    /// Filled, cancelled, expired or rejected orders.
    Closed,
    /// Every order.
    All,
}

impl OrderStatusFilter {
    /// Returns the upstream parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for OrderStatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for an order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersQuery {
    /// Status filter.
    pub status: OrderStatusFilter,
    /// Maximum number of orders.
    pub limit: Option<u32>,
    /// Symbols to filter on; empty means all.
    pub symbols: Vec<String>,
    /// Submission window.
    pub range: RangeQuery,
}

impl OrdersQuery {
    /// Creates a query for open orders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status filter.
    #[must_use]
    pub const fn status(mut self, status: OrderStatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Sets the order limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts to the given symbols.
    #[must_use]
    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the submission window.
    #[must_use]
    pub fn range(mut self, range: RangeQuery) -> Self {
        self.range = range;
        self
    }
}

/// Positions and orders. Never places, replaces or cancels anything.
#[derive(Debug, Clone)]
pub struct TradingHelper<C> {
    client: C,
    paper: bool,
    clock: Clock,
}

impl<C: RawClient> TradingHelper<C> {
    /// Creates the helper.
    pub fn new(client: C, config: HelperConfig) -> Self {
        Self {
            client,
            paper: config.paper,
            clock: Utc::now,
        }
    }

    /// Returns true when the helper is bound to the paper environment.
    #[must_use]
    pub const fn is_paper(&self) -> bool {
        self.paper
    }

    /// Replaces the clock used to resolve relative ranges.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// All open positions.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn positions(&self) -> Result<Vec<PositionRecord>> {
        let items = self.submit(&RawRequest::new(Endpoint::Positions))?.into_list()?;
        Ok(items
            .iter()
            .map(normalize_as::<PositionRecord>)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// The open position in `symbol`, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Propagates transport errors other than not-found, and normalization
    /// errors.
    pub fn position(&self, symbol: &str) -> Result<Option<PositionRecord>> {
        let request = RawRequest::new(Endpoint::Position).with_symbol(symbol);
        self.find(&request)
    }

    /// Orders matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn orders(&self, query: &OrdersQuery) -> Result<Vec<OrderRecord>> {
        let range = query.range.resolve((self.clock)());
        let mut request = RawRequest::new(Endpoint::Orders)
            .with_symbols(query.symbols.iter().cloned())
            .with_range(range)
            .with_limit(query.limit)
            .with_param("status", query.status)
            .with_param("direction", "desc");
        if let Some(after) = range.start {
            request = request.with_param("after", after.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if let Some(until) = range.end {
            request = request.with_param("until", until.to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        let items = self.submit(&request)?.into_list()?;
        Ok(items
            .iter()
            .map(normalize_as::<OrderRecord>)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// Orders still working.
    ///
    /// # Errors
    ///
    /// See [`Self::orders`].
    pub fn open_orders(&self) -> Result<Vec<OrderRecord>> {
        self.orders(&OrdersQuery::new())
    }

    /// One order by id, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates transport errors other than not-found, and normalization
    /// errors.
    pub fn order(&self, id: Uuid) -> Result<Option<OrderRecord>> {
        let request = RawRequest::new(Endpoint::Order).with_param("order_id", id);
        self.find(&request)
    }

    fn find<R: brokerkit_normalize::Record>(&self, request: &RawRequest) -> Result<Option<R>> {
        match self.client.submit(request) {
            Ok(response) => Ok(Some(normalize_as(&response.into_item()?)?)),
            Err(err) if is_not_found(&err) => {
                tracing::debug!(endpoint = %request.endpoint, "resource not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn submit(&self, request: &RawRequest) -> Result<RawResponse> {
        tracing::debug!(endpoint = %request.endpoint, symbols = request.symbols.len(), "submitting trading request");
        Ok(self.client.submit(request)?)
    }
}

fn is_not_found(err: &TransportError) -> bool {
    err.status() == Some(NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockClient, fixed_now, object};
    use brokerkit_types::BrokerError;
    use chrono::TimeDelta;
    use serde_json::json;

    const ORDER_ID: &str = "61e69015-8549-4bfd-b9c3-01e75843f47d";

    fn position_item(symbol: &str, side: &str) -> brokerkit_normalize::RawItem {
        object(json!({
            "asset_id": "904837e3-3b76-47ec-b432-046db621571b",
            "symbol": symbol,
            "exchange": "NASDAQ",
            "asset_class": "us_equity",
            "qty": "10",
            "side": side,
            "avg_entry_price": "100.0",
            "market_value": "1050.0",
            "unrealized_pl": "50.0"
        }))
    }

    fn order_item() -> brokerkit_normalize::RawItem {
        object(json!({
            "id": ORDER_ID,
            "symbol": "AAPL",
            "qty": "5",
            "side": "buy",
            "type": "market",
            "status": "filled",
            "filled_qty": "5",
            "filled_avg_price": "189.10",
            "created_at": "2024-06-14T13:31:00Z",
            "filled_at": "2024-06-14T13:31:01Z"
        }))
    }

    #[test]
    fn test_paper_flag_follows_config() {
        let client = MockClient::new();
        assert!(TradingHelper::new(&client, HelperConfig::default()).is_paper());
        let live = HelperConfig::default().with_paper(false);
        assert!(!TradingHelper::new(&client, live).is_paper());
    }

    #[test]
    fn test_positions() {
        let client = MockClient::new().respond(
            Endpoint::Positions,
            RawResponse::List(vec![position_item("AAPL", "long"), position_item("TSLA", "short")]),
        );
        let positions = TradingHelper::new(&client, HelperConfig::default()).positions().unwrap();
        assert_eq!(positions.len(), 2);
        assert!(positions[1].is_short());
        assert_eq!(positions[0].unrealized_pl, Some(50.0));
    }

    #[test]
    fn test_position_not_found_is_none() {
        let client = MockClient::new().fail(
            Endpoint::Position,
            TransportError::new("position does not exist").with_status(404),
        );
        assert_eq!(TradingHelper::new(&client, HelperConfig::default()).position("NVDA").unwrap(), None);
        assert_eq!(client.last_request().unwrap().symbols, vec!["NVDA"]);
    }

    #[test]
    fn test_position_other_errors_propagate() {
        let client = MockClient::new().fail(Endpoint::Position, TransportError::new("forbidden").with_status(403));
        let err = TradingHelper::new(&client, HelperConfig::default()).position("NVDA").unwrap_err();
        assert!(matches!(err, BrokerError::Transport(_)));
    }

    #[test]
    fn test_position_found() {
        let client = MockClient::new().respond(Endpoint::Position, RawResponse::Item(position_item("AAPL", "long")));
        let position = TradingHelper::new(&client, HelperConfig::default()).position("AAPL").unwrap().unwrap();
        assert_eq!(position.symbol, "AAPL");
    }

    #[test]
    fn test_orders_query_params() {
        let client = MockClient::new().respond(Endpoint::Orders, RawResponse::List(vec![order_item()]));
        let orders = TradingHelper::new(&client, HelperConfig::default())
            .with_clock(fixed_now)
            .orders(
                &OrdersQuery::new()
                    .status(OrderStatusFilter::Closed)
                    .limit(50)
                    .symbols(["AAPL"])
                    .range(RangeQuery::new().days_back(1)),
            )
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].is_filled());
        assert_eq!(orders[0].remaining_qty(), Some(0.0));

        let request = client.last_request().unwrap();
        assert_eq!(request.param("status"), Some("closed"));
        assert_eq!(request.param("after"), Some("2024-06-13T16:00:00Z"));
        assert_eq!(request.param("until"), Some("2024-06-14T16:00:00Z"));
        assert_eq!(request.range.start, Some(fixed_now() - TimeDelta::days(1)));
        assert_eq!(request.limit, Some(50));
    }

    #[test]
    fn test_open_orders_default() {
        let client = MockClient::new().respond(Endpoint::Orders, RawResponse::List(vec![]));
        assert!(TradingHelper::new(&client, HelperConfig::default()).open_orders().unwrap().is_empty());
        let request = client.last_request().unwrap();
        assert_eq!(request.param("status"), Some("open"));
        assert_eq!(request.param("after"), None);
    }

    #[test]
    fn test_order_by_id() {
        let id = Uuid::parse_str(ORDER_ID).unwrap();
        let client = MockClient::new().respond(Endpoint::Order, RawResponse::Item(order_item()));
        let order = TradingHelper::new(&client, HelperConfig::default()).order(id).unwrap().unwrap();
        assert_eq!(order.id, id);
        assert_eq!(order.order_type, "market");
        assert_eq!(client.last_request().unwrap().param("order_id"), Some(ORDER_ID));

        let missing = MockClient::new();
        assert_eq!(TradingHelper::new(&missing, HelperConfig::default()).order(id).unwrap(), None);
    }
}
