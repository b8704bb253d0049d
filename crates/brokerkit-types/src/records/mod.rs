//! Normalized domain records.

mod account;
mod market;
mod news;
mod option;

pub use account::{AccountRecord, OrderRecord, PortfolioHistoryRecord, PositionRecord};
pub use market::{BarRecord, QuoteRecord, SnapshotRecord, TradeRecord};
pub use news::NewsRecord;
pub use option::{GreeksRecord, OptionContract, OptionKind, OptionRecord, OptionSymbolError};

use serde::Serialize;

/// Any normalized record, tagged by its shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainRecord {
    /// OHLCV bar.
    Bar(BarRecord),
    /// Quote.
    Quote(QuoteRecord),
    /// Trade.
    Trade(TradeRecord),
    /// Market snapshot.
    Snapshot(Box<SnapshotRecord>),
    /// Account summary.
    Account(Box<AccountRecord>),
    /// Position.
    Position(PositionRecord),
    /// Order.
    Order(OrderRecord),
    /// News article.
    News(NewsRecord),
    /// Option snapshot.
    Option(Box<OptionRecord>),
    /// Option greeks.
    Greeks(GreeksRecord),
    /// Portfolio equity curve.
    PortfolioHistory(PortfolioHistoryRecord),
}

macro_rules! domain_record_from {
    ($($variant:ident($record:ty)),* $(,)?) => {
        $(
            impl From<$record> for DomainRecord {
                fn from(record: $record) -> Self {
                    Self::$variant(record)
                }
            }
        )*
    };
}

domain_record_from!(
    Bar(BarRecord),
    Quote(QuoteRecord),
    Trade(TradeRecord),
    Position(PositionRecord),
    Order(OrderRecord),
    News(NewsRecord),
    Greeks(GreeksRecord),
    PortfolioHistory(PortfolioHistoryRecord),
);

impl From<SnapshotRecord> for DomainRecord {
    fn from(record: SnapshotRecord) -> Self {
        Self::Snapshot(Box::new(record))
    }
}

impl From<AccountRecord> for DomainRecord {
    fn from(record: AccountRecord) -> Self {
        Self::Account(Box::new(record))
    }
}

impl From<OptionRecord> for DomainRecord {
    fn from(record: OptionRecord) -> Self {
        Self::Option(Box::new(record))
    }
}

impl DomainRecord {
    /// Returns the shape name of the record.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Self::Bar(_) => "bar",
            Self::Quote(_) => "quote",
            Self::Trade(_) => "trade",
            Self::Snapshot(_) => "snapshot",
            Self::Account(_) => "account",
            Self::Position(_) => "position",
            Self::Order(_) => "order",
            Self::News(_) => "news",
            Self::Option(_) => "option",
            Self::Greeks(_) => "greeks",
            Self::PortfolioHistory(_) => "portfolio_history",
        }
    }
}
