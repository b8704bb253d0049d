//! Normalization of raw brokerage records into brokerkit domain records.
//!
//! - [`RecordShape`] / [`FieldSpec`] - Field-mapping tables per shape
//! - [`normalize`] / [`normalize_as`] - Map one raw object
//! - [`normalize_keyed`] - Map an object filed under a symbol key
//! - [`Record`] - Typed construction for each record in the family

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brokerkit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod fields;
mod normalizer;
mod record;
mod shape;

pub use coerce::{FieldValue, coerce, to_float, to_timestamp};
pub use fields::{Fields, FromFieldValue};
pub use normalizer::{
    RawItem, normalize, normalize_as, normalize_keyed, normalize_keyed_as, normalize_list_as,
    normalize_value, normalize_value_as,
};
pub use record::Record;
pub use shape::{FieldKind, FieldSpec, RecordShape, UnknownShape};
