//! Record shapes and their field-mapping tables.

use std::str::FromStr;

/// Declared type of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Floating-point number, from a JSON number or numeric string.
    Float,
    /// Signed integer, from a JSON integer or integer string.
    Int,
    /// Unsigned integer, from a JSON integer or integer string.
    UInt,
    /// Boolean, from `true/false`, `0/1` or their string forms.
    Bool,
    /// Plain string.
    Text,
    /// Instant, from ISO-8601 text or unix seconds. Naive times are UTC.
    Timestamp,
    /// UUID string.
    Uuid,
    /// List of strings; a single string becomes a one-element list.
    TextList,
    /// List of objects reduced to the string under the given key.
    TextListOf(&'static str),
    /// List of numbers.
    FloatList,
    /// List of numbers where `null` entries are kept as gaps.
    OptFloatList,
    /// List of instants.
    TimestampList,
    /// Symbol text, falling back to the key the item was filed under.
    Symbol,
    /// Nested object normalized with another shape.
    Nested(RecordShape),
}

impl FieldKind {
    /// Human-readable type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "integer",
            Self::UInt => "unsigned integer",
            Self::Bool => "boolean",
            Self::Text | Self::Symbol => "string",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::TextList | Self::TextListOf(_) => "string list",
            Self::FloatList | Self::OptFloatList => "number list",
            Self::TimestampList => "timestamp list",
            Self::Nested(shape) => shape.name(),
        }
    }
}

/// One row of a field-mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the raw record.
    pub source: &'static str,
    /// Field name on the domain record.
    pub target: &'static str,
    /// Declared type.
    pub kind: FieldKind,
    /// Whether absence is an error.
    pub required: bool,
}

impl FieldSpec {
    const fn required(source: &'static str, target: &'static str, kind: FieldKind) -> Self {
        Self {
            source,
            target,
            kind,
            required: true,
        }
    }

    const fn optional(source: &'static str, target: &'static str, kind: FieldKind) -> Self {
        Self {
            source,
            target,
            kind,
            required: false,
        }
    }
}

use FieldKind::{
    Bool, Float, Int, Nested, OptFloatList, Symbol, Text, TextList, TextListOf, Timestamp,
    TimestampList, UInt, Uuid,
};

const BAR_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("S", "symbol", Symbol),
    FieldSpec::required("t", "timestamp", Timestamp),
    FieldSpec::required("o", "open", Float),
    FieldSpec::required("h", "high", Float),
    FieldSpec::required("l", "low", Float),
    FieldSpec::required("c", "close", Float),
    FieldSpec::required("v", "volume", Float),
    FieldSpec::optional("n", "trade_count", UInt),
    FieldSpec::optional("vw", "vwap", Float),
];

const QUOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("S", "symbol", Symbol),
    FieldSpec::required("t", "timestamp", Timestamp),
    FieldSpec::required("bp", "bid_price", Float),
    FieldSpec::required("bs", "bid_size", Float),
    FieldSpec::required("ap", "ask_price", Float),
    FieldSpec::required("as", "ask_size", Float),
    FieldSpec::optional("bx", "bid_exchange", Text),
    FieldSpec::optional("ax", "ask_exchange", Text),
    FieldSpec::optional("c", "conditions", TextList),
    FieldSpec::optional("z", "tape", Text),
];

const TRADE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("S", "symbol", Symbol),
    FieldSpec::required("t", "timestamp", Timestamp),
    FieldSpec::required("p", "price", Float),
    FieldSpec::required("s", "size", Float),
    FieldSpec::optional("x", "exchange", Text),
    FieldSpec::optional("i", "trade_id", UInt),
    FieldSpec::optional("c", "conditions", TextList),
    FieldSpec::optional("z", "tape", Text),
    FieldSpec::optional("tks", "taker_side", Text),
];

const SNAPSHOT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("symbol", "symbol", Symbol),
    FieldSpec::optional("latestTrade", "latest_trade", Nested(RecordShape::Trade)),
    FieldSpec::optional("latestQuote", "latest_quote", Nested(RecordShape::Quote)),
    FieldSpec::optional("minuteBar", "minute_bar", Nested(RecordShape::Bar)),
    FieldSpec::optional("dailyBar", "daily_bar", Nested(RecordShape::Bar)),
    FieldSpec::optional("prevDailyBar", "prev_daily_bar", Nested(RecordShape::Bar)),
];

const GREEKS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("delta", "delta", Float),
    FieldSpec::optional("gamma", "gamma", Float),
    FieldSpec::optional("theta", "theta", Float),
    FieldSpec::optional("vega", "vega", Float),
    FieldSpec::optional("rho", "rho", Float),
];

const OPTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("symbol", "symbol", Symbol),
    FieldSpec::optional("latestQuote", "latest_quote", Nested(RecordShape::Quote)),
    FieldSpec::optional("latestTrade", "latest_trade", Nested(RecordShape::Trade)),
    FieldSpec::optional("greeks", "greeks", Nested(RecordShape::Greeks)),
    FieldSpec::optional("impliedVolatility", "implied_volatility", Float),
];

const ACCOUNT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("account_number", "account_number", Text),
    FieldSpec::required("status", "status", Text),
    FieldSpec::optional("currency", "currency", Text),
    FieldSpec::required("cash", "cash", Float),
    FieldSpec::required("buying_power", "buying_power", Float),
    FieldSpec::required("equity", "equity", Float),
    FieldSpec::optional("portfolio_value", "portfolio_value", Float),
    FieldSpec::optional("last_equity", "last_equity", Float),
    FieldSpec::optional("long_market_value", "long_market_value", Float),
    FieldSpec::optional("short_market_value", "short_market_value", Float),
    FieldSpec::optional("initial_margin", "initial_margin", Float),
    FieldSpec::optional("maintenance_margin", "maintenance_margin", Float),
    FieldSpec::optional("multiplier", "multiplier", Float),
    FieldSpec::optional("pattern_day_trader", "pattern_day_trader", Bool),
    FieldSpec::optional("daytrade_count", "daytrade_count", Int),
    FieldSpec::optional("daytrading_buying_power", "daytrading_buying_power", Float),
    FieldSpec::optional("regt_buying_power", "regt_buying_power", Float),
    FieldSpec::optional("trading_blocked", "trading_blocked", Bool),
    FieldSpec::optional("account_blocked", "account_blocked", Bool),
    FieldSpec::optional("created_at", "created_at", Timestamp),
];

const POSITION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("asset_id", "asset_id", Uuid),
    FieldSpec::required("symbol", "symbol", Text),
    FieldSpec::optional("exchange", "exchange", Text),
    FieldSpec::optional("asset_class", "asset_class", Text),
    FieldSpec::required("qty", "qty", Float),
    FieldSpec::optional("qty_available", "qty_available", Float),
    FieldSpec::required("side", "side", Text),
    FieldSpec::required("avg_entry_price", "avg_entry_price", Float),
    FieldSpec::optional("market_value", "market_value", Float),
    FieldSpec::optional("current_price", "current_price", Float),
    FieldSpec::optional("cost_basis", "cost_basis", Float),
    FieldSpec::optional("unrealized_pl", "unrealized_pl", Float),
    FieldSpec::optional("unrealized_plpc", "unrealized_plpc", Float),
];

const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", "id", Uuid),
    FieldSpec::optional("client_order_id", "client_order_id", Text),
    FieldSpec::optional("symbol", "symbol", Text),
    FieldSpec::optional("qty", "qty", Float),
    FieldSpec::optional("notional", "notional", Float),
    FieldSpec::required("side", "side", Text),
    FieldSpec::required("type", "order_type", Text),
    FieldSpec::optional("time_in_force", "time_in_force", Text),
    FieldSpec::required("status", "status", Text),
    FieldSpec::required("filled_qty", "filled_qty", Float),
    FieldSpec::optional("filled_avg_price", "filled_avg_price", Float),
    FieldSpec::optional("limit_price", "limit_price", Float),
    FieldSpec::optional("stop_price", "stop_price", Float),
    FieldSpec::optional("order_class", "order_class", Text),
    FieldSpec::required("created_at", "created_at", Timestamp),
    FieldSpec::optional("submitted_at", "submitted_at", Timestamp),
    FieldSpec::optional("filled_at", "filled_at", Timestamp),
];

const NEWS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", "id", Int),
    FieldSpec::required("headline", "headline", Text),
    FieldSpec::optional("source", "source", Text),
    FieldSpec::optional("author", "author", Text),
    FieldSpec::optional("summary", "summary", Text),
    FieldSpec::optional("content", "content", Text),
    FieldSpec::optional("url", "url", Text),
    FieldSpec::required("symbols", "symbols", TextList),
    FieldSpec::optional("images", "image_urls", TextListOf("url")),
    FieldSpec::required("created_at", "created_at", Timestamp),
    FieldSpec::required("updated_at", "updated_at", Timestamp),
];

const PORTFOLIO_HISTORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("timestamp", "timestamps", TimestampList),
    FieldSpec::required("equity", "equity", OptFloatList),
    FieldSpec::optional("profit_loss", "profit_loss", OptFloatList),
    FieldSpec::optional("profit_loss_pct", "profit_loss_pct", OptFloatList),
    FieldSpec::optional("base_value", "base_value", Float),
    FieldSpec::optional("timeframe", "timeframe", Text),
];

/// Target shape of a normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordShape {
    /// OHLCV bar.
    Bar,
    /// Quote.
    Quote,
    /// Trade.
    Trade,
    /// Market snapshot with nested trade, quote and bars.
    Snapshot,
    /// Account summary.
    Account,
    /// Position.
    Position,
    /// Order.
    Order,
    /// News article.
    News,
    /// Option snapshot with nested quote, trade and greeks.
    Option,
    /// Option greeks.
    Greeks,
    /// Portfolio equity curve.
    PortfolioHistory,
}

impl RecordShape {
    /// Returns the field-mapping table.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Bar => BAR_FIELDS,
            Self::Quote => QUOTE_FIELDS,
            Self::Trade => TRADE_FIELDS,
            Self::Snapshot => SNAPSHOT_FIELDS,
            Self::Account => ACCOUNT_FIELDS,
            Self::Position => POSITION_FIELDS,
            Self::Order => ORDER_FIELDS,
            Self::News => NEWS_FIELDS,
            Self::Option => OPTION_FIELDS,
            Self::Greeks => GREEKS_FIELDS,
            Self::PortfolioHistory => PORTFOLIO_HISTORY_FIELDS,
        }
    }

    /// Returns the shape name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Quote => "quote",
            Self::Trade => "trade",
            Self::Snapshot => "snapshot",
            Self::Account => "account",
            Self::Position => "position",
            Self::Order => "order",
            Self::News => "news",
            Self::Option => "option",
            Self::Greeks => "greeks",
            Self::PortfolioHistory => "portfolio_history",
        }
    }

    /// Returns all shapes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Bar,
            Self::Quote,
            Self::Trade,
            Self::Snapshot,
            Self::Account,
            Self::Position,
            Self::Order,
            Self::News,
            Self::Option,
            Self::Greeks,
            Self::PortfolioHistory,
        ]
    }

    /// Looks up the spec for a target field.
    #[must_use]
    pub fn field(&self, target: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.target == target)
    }
}

impl std::fmt::Display for RecordShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordShape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|shape| shape.name() == wanted)
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

/// Error returned when parsing an unknown shape name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShape(String);

impl std::fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = RecordShape::all().iter().map(RecordShape::name).collect();
        write!(
            f,
            "unknown shape '{}', expected one of: {}",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for UnknownShape {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_targets_are_unique_per_shape() {
        for shape in RecordShape::all() {
            let mut seen = HashSet::new();
            for spec in shape.fields() {
                assert!(seen.insert(spec.target), "{shape}: duplicate {}", spec.target);
            }
        }
    }

    #[test]
    fn test_shape_parse() {
        assert_eq!("bar".parse::<RecordShape>().unwrap(), RecordShape::Bar);
        assert_eq!(
            "Portfolio-History".parse::<RecordShape>().unwrap(),
            RecordShape::PortfolioHistory
        );
        let err = "candle".parse::<RecordShape>().unwrap_err();
        assert!(err.to_string().contains("snapshot"));
    }

    #[test]
    fn test_field_lookup() {
        let spec = RecordShape::Order.field("order_type").unwrap();
        assert_eq!(spec.source, "type");
        assert!(spec.required);
        assert!(RecordShape::Bar.field("missing").is_none());
    }
}
