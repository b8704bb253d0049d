//! Raw client contract and multi-symbol fan-out for brokerkit.
//!
//! - [`RawClient`] - The injected collaborator that executes requests
//! - [`RawRequest`] / [`RawResponse`] - Request and response envelopes
//! - [`fan_out`] - Per-symbol calls with partial-failure aggregation
//! - [`fan_out_concurrent`] - Bounded concurrent fan-out with cancellation

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brokerkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod fanout;

pub use client::{AssetClass, Endpoint, RawClient, RawPayload, RawRequest, RawResponse};
pub use fanout::{
    BatchResult, CancellationFlag, DEFAULT_CONCURRENCY, distinct_symbols, fan_out, fan_out_blocking,
    fan_out_concurrent,
};
