//! CLI command implementations.

pub(crate) mod normalize;
pub(crate) mod range;
pub(crate) mod shapes;
pub(crate) mod timeframe;
