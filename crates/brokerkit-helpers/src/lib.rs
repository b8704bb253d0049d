//! Brokerage convenience helpers built on the brokerkit core components.
//!
//! - [`StockHelper`] / [`CryptoHelper`] - Market data per asset class
//! - [`OptionHelper`] - Option snapshots and chains
//! - [`NewsHelper`] - News with sensible default windows
//! - [`AccountHelper`] - Balances and portfolio history
//! - [`TradingHelper`] - Positions and orders
//! - [`HelperConfig`] - Explicit configuration shared by all helpers

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brokerkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod account;
mod config;
mod market;
mod news;
mod option;
mod support;
#[cfg(test)]
mod testing;
mod trading;

pub use account::{AccountHelper, PortfolioHistoryQuery};
pub use config::{
    ConfigError, DataFeed, ENV_CRYPTO_LOCATION, ENV_FEED, ENV_NEWS_DAYS_BACK, ENV_PAPER,
    HelperConfig,
};
pub use market::{BarsQuery, CryptoHelper, MarketDataHelper, StockHelper, TicksQuery};
pub use news::{NewsHelper, NewsQuery};
pub use option::OptionHelper;
pub use support::Clock;
pub use trading::{OrderStatusFilter, OrdersQuery, TradingHelper};
