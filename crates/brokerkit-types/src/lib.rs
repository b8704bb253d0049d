//! Core types for the brokerkit brokerage convenience layer.
//!
//! This crate provides the data structures shared by every helper:
//!
//! - [`TimeframeSpec`] - Canonical bar interval parsed from codes like `"4H"`
//! - [`RangeQuery`] / [`ResolvedRange`] - Time window resolution
//! - [`DomainRecord`] and the record family ([`BarRecord`], [`QuoteRecord`], ...)
//! - [`OptionContract`] - OCC option symbol decoding
//! - [`BrokerError`] - Error taxonomy

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brokerkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod records;
mod timeframe;

pub use date_range::{Period, RangeQuery, ResolvedRange, UnknownPeriod, resolve};
pub use error::{BrokerError, Cancelled, NormalizeError, Result, TransportError};
pub use records::{
    AccountRecord, BarRecord, DomainRecord, GreeksRecord, NewsRecord, OptionContract, OptionKind,
    OptionRecord, OptionSymbolError, OrderRecord, PortfolioHistoryRecord, PositionRecord,
    QuoteRecord, SnapshotRecord, TradeRecord,
};
pub use timeframe::{TimeframeParseError, TimeframeSpec, TimeframeUnit};
