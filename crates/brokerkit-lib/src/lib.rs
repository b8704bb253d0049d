//! Brokerage market-data and account convenience layer.
//!
//! This is a facade crate that re-exports functionality from the brokerkit
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use brokerkit_lib::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let client = MyClient::connect()?;
//!     let stocks = StockHelper::new(&client, HelperConfig::from_env()?);
//!
//!     let bars = stocks.bars("AAPL", &BarsQuery::new().timeframe("1H").days_back(5))?;
//!     println!("{} hourly bars", bars.len());
//!
//!     let quotes = stocks.latest_quotes(&["AAPL", "MSFT", "NOPE"]);
//!     for (symbol, err) in &quotes.failed {
//!         eprintln!("{symbol}: {err}");
//!     }
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brokerkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use brokerkit_types::*;

// Re-export the normalizer
pub use brokerkit_normalize::{
    FieldKind, FieldSpec, RawItem, Record, RecordShape, UnknownShape, normalize, normalize_as,
    normalize_keyed, normalize_keyed_as, normalize_list_as, normalize_value, normalize_value_as,
    to_float, to_timestamp,
};

// Re-export the client contract and fan-out
#[cfg(feature = "fetch")]
pub use brokerkit_fetch::{
    AssetClass, BatchResult, CancellationFlag, DEFAULT_CONCURRENCY, Endpoint, RawClient,
    RawPayload, RawRequest, RawResponse, distinct_symbols, fan_out, fan_out_blocking,
    fan_out_concurrent,
};

// Re-export helpers
#[cfg(feature = "helpers")]
pub use brokerkit_helpers::{
    AccountHelper, BarsQuery, Clock, ConfigError, CryptoHelper, DataFeed, HelperConfig,
    MarketDataHelper, NewsHelper, NewsQuery, OptionHelper, OrderStatusFilter, OrdersQuery,
    PortfolioHistoryQuery, StockHelper, TicksQuery, TradingHelper,
};

/// Prelude module for convenient imports.
///
/// ```
/// use brokerkit_lib::prelude::*;
/// ```
pub mod prelude {
    pub use brokerkit_types::{
        BarRecord, BrokerError, DomainRecord, NewsRecord, OptionRecord, QuoteRecord, RangeQuery,
        ResolvedRange, Result, SnapshotRecord, TimeframeSpec, TradeRecord,
    };

    pub use brokerkit_normalize::{RecordShape, normalize, normalize_as};

    #[cfg(feature = "fetch")]
    pub use brokerkit_fetch::{BatchResult, RawClient, RawRequest, RawResponse, fan_out};

    #[cfg(feature = "helpers")]
    pub use brokerkit_helpers::{
        AccountHelper, BarsQuery, CryptoHelper, HelperConfig, NewsHelper, NewsQuery, OptionHelper,
        StockHelper, TicksQuery, TradingHelper,
    };
}
