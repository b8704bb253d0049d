//! Market data records: bars, quotes, trades and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar (candlestick) for one symbol and interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    /// Symbol the bar belongs to.
    pub symbol: String,
    /// Bar open time.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the interval.
    pub high: f64,
    /// Lowest price during the interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume. Fractional for crypto.
    pub volume: f64,
    /// Number of trades in the interval.
    pub trade_count: Option<u64>,
    /// Volume-weighted average price.
    pub vwap: Option<f64>,
}

impl BarRecord {
    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns the typical price ((high + low + close) / 3).
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Top-of-book quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Symbol the quote belongs to.
    pub symbol: String,
    /// Quote time.
    pub timestamp: DateTime<Utc>,
    /// Best bid price.
    pub bid_price: f64,
    /// Size available at the bid.
    pub bid_size: f64,
    /// Best ask price.
    pub ask_price: f64,
    /// Size available at the ask.
    pub ask_size: f64,
    /// Exchange code of the bid.
    pub bid_exchange: Option<String>,
    /// Exchange code of the ask.
    pub ask_exchange: Option<String>,
    /// Quote condition flags.
    pub conditions: Option<Vec<String>>,
    /// Consolidated tape.
    pub tape: Option<String>,
}

impl QuoteRecord {
    /// Returns the spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }

    /// Returns the mid price (average of ask and bid).
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.ask_price + self.bid_price) / 2.0
    }
}

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Symbol traded.
    pub symbol: String,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
    /// Trade price.
    pub price: f64,
    /// Trade size. Fractional for crypto.
    pub size: f64,
    /// Exchange code.
    pub exchange: Option<String>,
    /// Upstream trade identifier.
    pub trade_id: Option<u64>,
    /// Trade condition flags.
    pub conditions: Option<Vec<String>>,
    /// Consolidated tape.
    pub tape: Option<String>,
    /// Aggressor side (`B` or `S`), crypto only.
    pub taker_side: Option<String>,
}

impl TradeRecord {
    /// Returns the traded notional (price * size).
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// Latest market state for a symbol. Each slot is independently optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Symbol the snapshot belongs to.
    pub symbol: String,
    /// Most recent trade.
    pub latest_trade: Option<TradeRecord>,
    /// Most recent quote.
    pub latest_quote: Option<QuoteRecord>,
    /// Most recent minute bar.
    pub minute_bar: Option<BarRecord>,
    /// Current daily bar.
    pub daily_bar: Option<BarRecord>,
    /// Previous session's daily bar.
    pub prev_daily_bar: Option<BarRecord>,
}

impl SnapshotRecord {
    /// Returns the last traded price, if a trade is present.
    #[must_use]
    pub fn last_price(&self) -> Option<f64> {
        self.latest_trade.as_ref().map(|trade| trade.price)
    }

    /// Returns the change versus the previous daily close, as a fraction.
    #[must_use]
    pub fn change_from_prev_close(&self) -> Option<f64> {
        let last = self.last_price()?;
        let prev = self.prev_daily_bar.as_ref()?.close;
        (prev != 0.0).then(|| (last - prev) / prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn bar(open: f64, close: f64) -> BarRecord {
        BarRecord {
            symbol: "SPY".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            open,
            high: 476.0,
            low: 470.0,
            close,
            volume: 1_000.0,
            trade_count: Some(10),
            vwap: None,
        }
    }

    #[test]
    fn test_bar_shape() {
        let up = bar(471.0, 475.0);
        assert_relative_eq!(up.range(), 6.0);
        assert_relative_eq!(up.body(), 4.0);
        assert!(up.is_bullish());
        assert!(!up.is_bearish());
        assert!(bar(475.0, 471.0).is_bearish());
    }

    #[test]
    fn test_quote_spread_and_mid() {
        let quote = QuoteRecord {
            symbol: "SPY".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            bid_price: 100.0,
            bid_size: 3.0,
            ask_price: 100.5,
            ask_size: 1.0,
            bid_exchange: None,
            ask_exchange: None,
            conditions: None,
            tape: None,
        };
        assert_relative_eq!(quote.spread(), 0.5);
        assert_relative_eq!(quote.mid(), 100.25);
    }

    #[test]
    fn test_snapshot_change() {
        let trade = TradeRecord {
            symbol: "SPY".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap(),
            price: 484.0,
            size: 5.0,
            exchange: None,
            trade_id: None,
            conditions: None,
            tape: None,
            taker_side: None,
        };
        let snapshot = SnapshotRecord {
            symbol: "SPY".to_string(),
            latest_trade: Some(trade),
            latest_quote: None,
            minute_bar: None,
            daily_bar: None,
            prev_daily_bar: Some(bar(470.0, 440.0)),
        };
        assert_relative_eq!(snapshot.last_price().unwrap(), 484.0);
        assert_relative_eq!(snapshot.change_from_prev_close().unwrap(), 0.1);

        let empty = SnapshotRecord {
            prev_daily_bar: None,
            ..snapshot
        };
        assert_eq!(empty.change_from_prev_close(), None);
    }
}
