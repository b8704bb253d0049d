//! Account, position, order and portfolio history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Day trades allowed in a rolling window before the pattern day trader flag.
const DAY_TRADE_ALLOWANCE: i64 = 3;

/// Brokerage account summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account number.
    pub account_number: String,
    /// Account status (e.g. `ACTIVE`).
    pub status: String,
    /// Account currency.
    pub currency: Option<String>,
    /// Cash balance.
    pub cash: f64,
    /// Buying power.
    pub buying_power: f64,
    /// Equity (cash + long - short market value).
    pub equity: f64,
    /// Total portfolio value.
    pub portfolio_value: Option<f64>,
    /// Equity at the previous close.
    pub last_equity: Option<f64>,
    /// Long market value.
    pub long_market_value: Option<f64>,
    /// Short market value.
    pub short_market_value: Option<f64>,
    /// Initial margin requirement.
    pub initial_margin: Option<f64>,
    /// Maintenance margin requirement.
    pub maintenance_margin: Option<f64>,
    /// Margin multiplier.
    pub multiplier: Option<f64>,
    /// Pattern day trader flag.
    pub pattern_day_trader: Option<bool>,
    /// Day trades in the rolling five-day window.
    pub daytrade_count: Option<i64>,
    /// Day trading buying power.
    pub daytrading_buying_power: Option<f64>,
    /// Reg T buying power.
    pub regt_buying_power: Option<f64>,
    /// Whether trading is blocked.
    pub trading_blocked: Option<bool>,
    /// Whether the account is blocked.
    pub account_blocked: Option<bool>,
    /// Account creation time.
    pub created_at: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// Returns the day trades left before the account is flagged.
    ///
    /// Zero once the account is already a pattern day trader.
    #[must_use]
    pub fn day_trades_remaining(&self) -> u32 {
        if self.pattern_day_trader == Some(true) {
            return 0;
        }
        let used = self.daytrade_count.unwrap_or(0).max(0);
        u32::try_from(DAY_TRADE_ALLOWANCE.saturating_sub(used).max(0)).unwrap_or(0)
    }

    /// Returns true if the account or its trading is blocked.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.account_blocked == Some(true) || self.trading_blocked == Some(true)
    }

    /// Returns the equity change since the previous close.
    #[must_use]
    pub fn equity_change(&self) -> Option<f64> {
        self.last_equity.map(|last| self.equity - last)
    }
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Asset identifier.
    pub asset_id: Uuid,
    /// Symbol held.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Option<String>,
    /// Asset class (`us_equity`, `crypto`, `us_option`).
    pub asset_class: Option<String>,
    /// Quantity held (negative for shorts on some feeds).
    pub qty: f64,
    /// Quantity not tied up in open orders.
    pub qty_available: Option<f64>,
    /// `long` or `short`.
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: f64,
    /// Current market value.
    pub market_value: Option<f64>,
    /// Current price.
    pub current_price: Option<f64>,
    /// Total cost basis.
    pub cost_basis: Option<f64>,
    /// Unrealized profit and loss.
    pub unrealized_pl: Option<f64>,
    /// Unrealized profit and loss as a fraction.
    pub unrealized_plpc: Option<f64>,
}

impl PositionRecord {
    /// Returns true for a short position.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.side.eq_ignore_ascii_case("short")
    }
}

/// An order as reported by the trading service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order identifier.
    pub id: Uuid,
    /// Client-assigned identifier.
    pub client_order_id: Option<String>,
    /// Symbol; absent on multi-leg parents.
    pub symbol: Option<String>,
    /// Ordered quantity.
    pub qty: Option<f64>,
    /// Ordered notional.
    pub notional: Option<f64>,
    /// `buy` or `sell`.
    pub side: String,
    /// `market`, `limit`, `stop`, ...
    pub order_type: String,
    /// Time in force.
    pub time_in_force: Option<String>,
    /// Order status.
    pub status: String,
    /// Filled quantity.
    pub filled_qty: f64,
    /// Average fill price.
    pub filled_avg_price: Option<f64>,
    /// Limit price.
    pub limit_price: Option<f64>,
    /// Stop price.
    pub stop_price: Option<f64>,
    /// Order class (`simple`, `bracket`, ...).
    pub order_class: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Fill time.
    pub filled_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Returns true once the order is completely filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status.eq_ignore_ascii_case("filled")
    }

    /// Returns the quantity still open, when the order was sized by quantity.
    #[must_use]
    pub fn remaining_qty(&self) -> Option<f64> {
        self.qty.map(|qty| (qty - self.filled_qty).max(0.0))
    }
}

/// Equity curve of the account over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHistoryRecord {
    /// Sample times.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Equity per sample; gaps are `None`.
    pub equity: Vec<Option<f64>>,
    /// Profit and loss per sample.
    pub profit_loss: Option<Vec<Option<f64>>>,
    /// Profit and loss as a fraction per sample.
    pub profit_loss_pct: Option<Vec<Option<f64>>>,
    /// Base value the profit and loss is measured from.
    pub base_value: Option<f64>,
    /// Sample resolution reported upstream.
    pub timeframe: Option<String>,
}

impl PortfolioHistoryRecord {
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Iterates `(timestamp, equity)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, Option<f64>)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.equity.iter().copied())
    }

    /// Returns the most recent non-null equity sample.
    #[must_use]
    pub fn latest_equity(&self) -> Option<f64> {
        self.equity.iter().rev().find_map(|value| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account(pdt: Option<bool>, count: Option<i64>) -> AccountRecord {
        AccountRecord {
            account_number: "PA1".to_string(),
            status: "ACTIVE".to_string(),
            currency: Some("USD".to_string()),
            cash: 1_000.0,
            buying_power: 2_000.0,
            equity: 1_500.0,
            portfolio_value: None,
            last_equity: Some(1_400.0),
            long_market_value: None,
            short_market_value: None,
            initial_margin: None,
            maintenance_margin: None,
            multiplier: None,
            pattern_day_trader: pdt,
            daytrade_count: count,
            daytrading_buying_power: None,
            regt_buying_power: None,
            trading_blocked: None,
            account_blocked: None,
            created_at: None,
        }
    }

    #[test]
    fn test_day_trades_remaining() {
        assert_eq!(account(Some(false), Some(1)).day_trades_remaining(), 2);
        assert_eq!(account(None, None).day_trades_remaining(), 3);
        assert_eq!(account(Some(false), Some(5)).day_trades_remaining(), 0);
        assert_eq!(account(Some(true), Some(0)).day_trades_remaining(), 0);
        assert_eq!(account(Some(false), Some(i64::MIN)).day_trades_remaining(), 3);
        assert_eq!(account(Some(false), Some(i64::MAX)).day_trades_remaining(), 0);
    }

    #[test]
    fn test_blocked_and_change() {
        let mut acct = account(None, None);
        assert!(!acct.is_blocked());
        assert_eq!(acct.equity_change(), Some(100.0));
        acct.trading_blocked = Some(true);
        assert!(acct.is_blocked());
    }

    #[test]
    fn test_portfolio_points() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let history = PortfolioHistoryRecord {
            timestamps: vec![t0, t1],
            equity: vec![Some(10.0), None],
            profit_loss: None,
            profit_loss_pct: None,
            base_value: Some(10.0),
            timeframe: Some("1D".to_string()),
        };
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest_equity(), Some(10.0));
        assert_eq!(history.points().last(), Some((t1, None)));
    }
}
