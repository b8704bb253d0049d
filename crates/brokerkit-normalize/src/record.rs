//! Assembly of domain records from collected fields.

use brokerkit_types::{
    AccountRecord, BarRecord, DomainRecord, GreeksRecord, NewsRecord, NormalizeError,
    OptionContract, OptionRecord, OrderRecord, PortfolioHistoryRecord, PositionRecord,
    QuoteRecord, SnapshotRecord, TradeRecord,
};
use serde_json::{Map, Value};

use crate::fields::Fields;
use crate::shape::RecordShape;

/// A domain record that can be built from a raw record.
pub trait Record: Sized + Into<DomainRecord> {
    /// Shape whose table describes the raw layout.
    const SHAPE: RecordShape;

    /// Builds the record from collected fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or has the wrong kind.
    fn from_fields(fields: &mut Fields) -> Result<Self, NormalizeError>;

    /// Normalizes a raw object into this record.
    ///
    /// # Errors
    ///
    /// See [`Fields::collect`].
    fn from_raw(raw: &Map<String, Value>, key: Option<&str>) -> Result<Self, NormalizeError> {
        let mut fields = Fields::collect(raw, Self::SHAPE, key)?;
        Self::from_fields(&mut fields)
    }
}

impl Record for BarRecord {
    const SHAPE: RecordShape = RecordShape::Bar;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            symbol: f.required("symbol")?,
            timestamp: f.required("timestamp")?,
            open: f.required("open")?,
            high: f.required("high")?,
            low: f.required("low")?,
            close: f.required("close")?,
            volume: f.required("volume")?,
            trade_count: f.optional("trade_count")?,
            vwap: f.optional("vwap")?,
        })
    }
}

impl Record for QuoteRecord {
    const SHAPE: RecordShape = RecordShape::Quote;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            symbol: f.required("symbol")?,
            timestamp: f.required("timestamp")?,
            bid_price: f.required("bid_price")?,
            bid_size: f.required("bid_size")?,
            ask_price: f.required("ask_price")?,
            ask_size: f.required("ask_size")?,
            bid_exchange: f.optional("bid_exchange")?,
            ask_exchange: f.optional("ask_exchange")?,
            conditions: f.optional("conditions")?,
            tape: f.optional("tape")?,
        })
    }
}

impl Record for TradeRecord {
    const SHAPE: RecordShape = RecordShape::Trade;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            symbol: f.required("symbol")?,
            timestamp: f.required("timestamp")?,
            price: f.required("price")?,
            size: f.required("size")?,
            exchange: f.optional("exchange")?,
            trade_id: f.optional("trade_id")?,
            conditions: f.optional("conditions")?,
            tape: f.optional("tape")?,
            taker_side: f.optional("taker_side")?,
        })
    }
}

impl Record for SnapshotRecord {
    const SHAPE: RecordShape = RecordShape::Snapshot;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            symbol: f.required("symbol")?,
            latest_trade: f.optional("latest_trade")?,
            latest_quote: f.optional("latest_quote")?,
            minute_bar: f.optional("minute_bar")?,
            daily_bar: f.optional("daily_bar")?,
            prev_daily_bar: f.optional("prev_daily_bar")?,
        })
    }
}

impl Record for GreeksRecord {
    const SHAPE: RecordShape = RecordShape::Greeks;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            delta: f.optional("delta")?,
            gamma: f.optional("gamma")?,
            theta: f.optional("theta")?,
            vega: f.optional("vega")?,
            rho: f.optional("rho")?,
        })
    }
}

impl Record for OptionRecord {
    const SHAPE: RecordShape = RecordShape::Option;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        let symbol: String = f.required("symbol")?;
        Ok(Self {
            contract: OptionContract::parse(&symbol).ok(),
            symbol,
            latest_quote: f.optional("latest_quote")?,
            latest_trade: f.optional("latest_trade")?,
            greeks: f.optional("greeks")?,
            implied_volatility: f.optional("implied_volatility")?,
        })
    }
}

impl Record for AccountRecord {
    const SHAPE: RecordShape = RecordShape::Account;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            account_number: f.required("account_number")?,
            status: f.required("status")?,
            currency: f.optional("currency")?,
            cash: f.required("cash")?,
            buying_power: f.required("buying_power")?,
            equity: f.required("equity")?,
            portfolio_value: f.optional("portfolio_value")?,
            last_equity: f.optional("last_equity")?,
            long_market_value: f.optional("long_market_value")?,
            short_market_value: f.optional("short_market_value")?,
            initial_margin: f.optional("initial_margin")?,
            maintenance_margin: f.optional("maintenance_margin")?,
            multiplier: f.optional("multiplier")?,
            pattern_day_trader: f.optional("pattern_day_trader")?,
            daytrade_count: f.optional("daytrade_count")?,
            daytrading_buying_power: f.optional("daytrading_buying_power")?,
            regt_buying_power: f.optional("regt_buying_power")?,
            trading_blocked: f.optional("trading_blocked")?,
            account_blocked: f.optional("account_blocked")?,
            created_at: f.optional("created_at")?,
        })
    }
}

impl Record for PositionRecord {
    const SHAPE: RecordShape = RecordShape::Position;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            asset_id: f.required("asset_id")?,
            symbol: f.required("symbol")?,
            exchange: f.optional("exchange")?,
            asset_class: f.optional("asset_class")?,
            qty: f.required("qty")?,
            qty_available: f.optional("qty_available")?,
            side: f.required("side")?,
            avg_entry_price: f.required("avg_entry_price")?,
            market_value: f.optional("market_value")?,
            current_price: f.optional("current_price")?,
            cost_basis: f.optional("cost_basis")?,
            unrealized_pl: f.optional("unrealized_pl")?,
            unrealized_plpc: f.optional("unrealized_plpc")?,
        })
    }
}

impl Record for OrderRecord {
    const SHAPE: RecordShape = RecordShape::Order;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            id: f.required("id")?,
            client_order_id: f.optional("client_order_id")?,
            symbol: f.optional("symbol")?,
            qty: f.optional("qty")?,
            notional: f.optional("notional")?,
            side: f.required("side")?,
            order_type: f.required("order_type")?,
            time_in_force: f.optional("time_in_force")?,
            status: f.required("status")?,
            filled_qty: f.required("filled_qty")?,
            filled_avg_price: f.optional("filled_avg_price")?,
            limit_price: f.optional("limit_price")?,
            stop_price: f.optional("stop_price")?,
            order_class: f.optional("order_class")?,
            created_at: f.required("created_at")?,
            submitted_at: f.optional("submitted_at")?,
            filled_at: f.optional("filled_at")?,
        })
    }
}

impl Record for NewsRecord {
    const SHAPE: RecordShape = RecordShape::News;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        Ok(Self {
            id: f.required("id")?,
            headline: f.required("headline")?,
            source: f.optional("source")?,
            author: f.optional("author")?,
            summary: f.optional("summary")?,
            content: f.optional("content")?,
            url: f.optional("url")?,
            symbols: f.required("symbols")?,
            image_urls: f.optional("image_urls")?,
            created_at: f.required("created_at")?,
            updated_at: f.required("updated_at")?,
        })
    }
}

impl Record for PortfolioHistoryRecord {
    const SHAPE: RecordShape = RecordShape::PortfolioHistory;

    fn from_fields(f: &mut Fields) -> Result<Self, NormalizeError> {
        let timestamps: Vec<_> = f.required("timestamps")?;
        let equity: Vec<Option<f64>> = f.required("equity")?;
        if equity.len() != timestamps.len() {
            return Err(NormalizeError::MalformedField {
                field: "equity".to_string(),
                expected: "one sample per timestamp",
                value: format!("{} samples for {} timestamps", equity.len(), timestamps.len()),
            });
        }
        Ok(Self {
            timestamps,
            equity,
            profit_loss: f.optional("profit_loss")?,
            profit_loss_pct: f.optional("profit_loss_pct")?,
            base_value: f.optional("base_value")?,
            timeframe: f.optional("timeframe")?,
        })
    }
}

/// Builds the record for `shape` as a [`DomainRecord`].
pub(crate) fn build(
    raw: &Map<String, Value>,
    shape: RecordShape,
    key: Option<&str>,
) -> Result<DomainRecord, NormalizeError> {
    match shape {
        RecordShape::Bar => BarRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Quote => QuoteRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Trade => TradeRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Snapshot => SnapshotRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Account => AccountRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Position => PositionRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Order => OrderRecord::from_raw(raw, key).map(Into::into),
        RecordShape::News => NewsRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Option => OptionRecord::from_raw(raw, key).map(Into::into),
        RecordShape::Greeks => GreeksRecord::from_raw(raw, key).map(Into::into),
        RecordShape::PortfolioHistory => PortfolioHistoryRecord::from_raw(raw, key).map(Into::into),
    }
}
