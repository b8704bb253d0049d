//! Account summary and portfolio history helper.

use brokerkit_fetch::{Endpoint, RawClient, RawRequest};
use brokerkit_normalize::normalize_as;
use brokerkit_types::{AccountRecord, PortfolioHistoryRecord, RangeQuery, Result, TimeframeSpec};
use chrono::Utc;

use crate::config::HelperConfig;
use crate::support::Clock;

/// Parameters for a portfolio history request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioHistoryQuery {
    /// Upstream period code (e.g. `1M`, `1A`), passed through as is.
    pub period: Option<String>,
    /// Sample resolution as a timeframe code.
    pub timeframe: Option<String>,
    /// Explicit window; a relative lookback is anchored on its end.
    pub range: RangeQuery,
    /// Include extended-hours samples.
    pub extended_hours: Option<bool>,
}

impl PortfolioHistoryQuery {
    /// Creates a query left to the upstream defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upstream period code.
    #[must_use]
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Sets the sample resolution.
    #[must_use]
    pub fn timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// Sets the window.
    #[must_use]
    pub fn range(mut self, range: RangeQuery) -> Self {
        self.range = range;
        self
    }

    /// Sets extended-hours inclusion.
    #[must_use]
    pub const fn extended_hours(mut self, include: bool) -> Self {
        self.extended_hours = Some(include);
        self
    }
}

/// Account balances, day-trading status and equity history.
#[derive(Debug, Clone)]
pub struct AccountHelper<C> {
    client: C,
    paper: bool,
    clock: Clock,
}

impl<C: RawClient> AccountHelper<C> {
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

    /// Full account summary.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn account(&self) -> Result<AccountRecord> {
        let request = RawRequest::new(Endpoint::Account);
        tracing::debug!(endpoint = %request.endpoint, "submitting account request");
        let item = self.client.submit(&request)?.into_item()?;
        Ok(normalize_as(&item)?)
    }

    /// Cash balance.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn cash(&self) -> Result<f64> {
        Ok(self.account()?.cash)
    }

    /// Buying power.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn buying_power(&self) -> Result<f64> {
        Ok(self.account()?.buying_power)
    }

    /// Equity.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn equity(&self) -> Result<f64> {
        Ok(self.account()?.equity)
    }

    /// Portfolio value, when reported.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn portfolio_value(&self) -> Result<Option<f64>> {
        Ok(self.account()?.portfolio_value)
    }

    /// Whether the account carries the pattern day trader flag.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn is_pattern_day_trader(&self) -> Result<bool> {
        Ok(self.account()?.pattern_day_trader == Some(true))
    }

    /// Day trades left before the account is flagged.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn day_trades_remaining(&self) -> Result<u32> {
        Ok(self.account()?.day_trades_remaining())
    }

    /// Whether the account or its trading is blocked.
    ///
    /// # Errors
    ///
    /// See [`Self::account`].
    pub fn is_blocked(&self) -> Result<bool> {
        Ok(self.account()?.is_blocked())
    }

    /// Equity curve over a window.
    ///
    /// # Errors
    ///
    /// Returns [`brokerkit_types::BrokerError::InvalidTimeframe`] before any
    /// call for an unparseable resolution, and otherwise propagates
    /// transport and normalization errors.
    pub fn portfolio_history(&self, query: &PortfolioHistoryQuery) -> Result<PortfolioHistoryRecord> {
        let mut request = RawRequest::new(Endpoint::PortfolioHistory)
            .with_range(query.range.resolve((self.clock)()));
        if let Some(timeframe) = &query.timeframe {
            let timeframe = TimeframeSpec::parse(timeframe)?;
            request = request
                .with_timeframe(timeframe)
                .with_param("timeframe", history_resolution(timeframe));
        }
        if let Some(period) = &query.period {
            request = request.with_param("period", period.trim());
        }
        if let Some(extended) = query.extended_hours {
            request = request.with_param("extended_hours", extended);
        }

        tracing::debug!(endpoint = %request.endpoint, "submitting portfolio history request");
        let item = self.client.submit(&request)?.into_item()?;
        Ok(normalize_as(&item)?)
    }
}

/// Resolution code in the portfolio history dialect (`1Min`, `1H`, `1D`).
fn history_resolution(timeframe: TimeframeSpec) -> String {
    use brokerkit_types::TimeframeUnit;
    let unit = match timeframe.unit() {
        TimeframeUnit::Minute => "Min",
        TimeframeUnit::Hour => "H",
        TimeframeUnit::Day => "D",
        TimeframeUnit::Week => "W",
        TimeframeUnit::Month => "M",
    };
    format!("{}{unit}", timeframe.amount())
}
