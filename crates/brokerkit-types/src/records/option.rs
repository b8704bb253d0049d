//! Option contract symbols, greeks and option snapshot records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{QuoteRecord, TradeRecord};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Call => "call",
            Self::Put => "put",
        })
    }
}

/// Error returned for a symbol that is not in OCC format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not an OCC option symbol (ROOT + YYMMDD + C/P + 8-digit strike)")]
pub struct OptionSymbolError(String);

/// Contract terms decoded from an OCC option symbol.
///
/// OCC layout: root (1-6 chars), expiration `YYMMDD`, `C` or `P`, then the
/// strike times 1000 as eight digits. `AAPL250117C00150000` is the AAPL
/// 150.0 call expiring 2025-01-17.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying root symbol.
    pub underlying: String,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub kind: OptionKind,
    /// Strike price.
    pub strike: f64,
}

impl OptionContract {
    const STRIKE_DIGITS: usize = 8;
    const DATE_DIGITS: usize = 6;
    const MAX_ROOT: usize = 6;

    /// Parses an OCC option symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol does not follow the OCC layout or the
    /// encoded date is invalid.
    pub fn parse(symbol: &str) -> Result<Self, OptionSymbolError> {
        let err = || OptionSymbolError(symbol.to_string());
        let symbol = symbol.trim();
        if !symbol.is_ascii() {
            return Err(err());
        }

        let tail = Self::STRIKE_DIGITS + 1 + Self::DATE_DIGITS;
        let root_len = symbol.len().checked_sub(tail).ok_or_else(err)?;
        if root_len == 0 || root_len > Self::MAX_ROOT {
            return Err(err());
        }

        let (root, rest) = symbol.split_at(root_len);
        let (date, rest) = rest.split_at(Self::DATE_DIGITS);
        let (kind, strike) = rest.split_at(1);

        if !date.bytes().all(|b| b.is_ascii_digit()) || !strike.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let kind = match kind {
            "C" => OptionKind::Call,
            "P" => OptionKind::Put,
            _ => return Err(err()),
        };

        let year: i32 = date[0..2].parse().map_err(|_| err())?;
        let month: u32 = date[2..4].parse().map_err(|_| err())?;
        let day: u32 = date[4..6].parse().map_err(|_| err())?;
        let expiration = NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(err)?;

        let strike_thousandths: u32 = strike.parse().map_err(|_| err())?;

        Ok(Self {
            underlying: root.trim_end().to_string(),
            expiration,
            kind,
            strike: f64::from(strike_thousandths) / 1000.0,
        })
    }
}

/// Option sensitivities. Any of them may be missing upstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GreeksRecord {
    /// Delta.
    pub delta: Option<f64>,
    /// Gamma.
    pub gamma: Option<f64>,
    /// Theta.
    pub theta: Option<f64>,
    /// Vega.
    pub vega: Option<f64>,
    /// Rho.
    pub rho: Option<f64>,
}

/// Snapshot of one option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// OCC contract symbol.
    pub symbol: String,
    /// Terms decoded from the symbol, `None` for non-OCC symbols.
    pub contract: Option<OptionContract>,
    /// Most recent quote.
    pub latest_quote: Option<QuoteRecord>,
    /// Most recent trade.
    pub latest_trade: Option<TradeRecord>,
    /// Greeks.
    pub greeks: Option<GreeksRecord>,
    /// Implied volatility.
    pub implied_volatility: Option<f64>,
}

impl OptionRecord {
    /// Returns the strike price.
    #[must_use]
    pub fn strike(&self) -> Option<f64> {
        self.contract.as_ref().map(|c| c.strike)
    }

    /// Returns the expiration date.
    #[must_use]
    pub fn expiration(&self) -> Option<NaiveDate> {
        self.contract.as_ref().map(|c| c.expiration)
    }

    /// Returns call or put.
    #[must_use]
    pub fn kind(&self) -> Option<OptionKind> {
        self.contract.as_ref().map(|c| c.kind)
    }

    /// Returns the best bid.
    #[must_use]
    pub fn bid(&self) -> Option<f64> {
        self.latest_quote.as_ref().map(|q| q.bid_price)
    }

    /// Returns the best ask.
    #[must_use]
    pub fn ask(&self) -> Option<f64> {
        self.latest_quote.as_ref().map(|q| q.ask_price)
    }

    /// Returns the mid price, when both sides are quoted and non-zero.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        let quote = self.latest_quote.as_ref()?;
        (quote.bid_price > 0.0 && quote.ask_price > 0.0).then(|| quote.mid())
    }

    /// Returns the last traded price.
    #[must_use]
    pub fn last_price(&self) -> Option<f64> {
        self.latest_trade.as_ref().map(|t| t.price)
    }

    /// Returns delta.
    #[must_use]
    pub fn delta(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.delta)
    }

    /// Returns gamma.
    #[must_use]
    pub fn gamma(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.gamma)
    }

    /// Returns theta.
    #[must_use]
    pub fn theta(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.theta)
    }

    /// Returns vega.
    #[must_use]
    pub fn vega(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.vega)
    }

    /// Returns rho.
    #[must_use]
    pub fn rho(&self) -> Option<f64> {
        self.greeks.and_then(|g| g.rho)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_occ_call() {
        let contract = OptionContract::parse("AAPL250117C00150000").unwrap();
        assert_eq!(contract.underlying, "AAPL");
        assert_eq!(contract.expiration, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(contract.kind, OptionKind::Call);
        assert_relative_eq!(contract.strike, 150.0);
    }

    #[test]
    fn test_parse_occ_put_fractional_strike() {
        let contract = OptionContract::parse("SPY241220P00452500").unwrap();
        assert_eq!(contract.underlying, "SPY");
        assert_eq!(contract.kind, OptionKind::Put);
        assert_relative_eq!(contract.strike, 452.5);
    }

    #[test]
    fn test_parse_single_letter_root() {
        let contract = OptionContract::parse("F250620C00012000").unwrap();
        assert_eq!(contract.underlying, "F");
        assert_relative_eq!(contract.strike, 12.0);
    }

    #[test]
    fn test_rejects_non_occ() {
        for symbol in [
            "AAPL",
            "250117C00150000",
            "AAPL250117X00150000",
            "AAPL251317C00150000",
            "AAPL25011C700150000",
            "TOOLONGROOT250117C00150000",
        ] {
            assert!(OptionContract::parse(symbol).is_err(), "{symbol}");
        }
    }

    #[test]
    fn test_mid_needs_both_sides() {
        let quote = QuoteRecord {
            symbol: "AAPL250117C00150000".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 12, 2, 15, 0, 0).unwrap(),
            bid_price: 2.0,
            bid_size: 10.0,
            ask_price: 2.2,
            ask_size: 5.0,
            bid_exchange: None,
            ask_exchange: None,
            conditions: None,
            tape: None,
        };
        let record = OptionRecord {
            symbol: quote.symbol.clone(),
            contract: OptionContract::parse(&quote.symbol).ok(),
            latest_quote: Some(quote),
            latest_trade: None,
            greeks: Some(GreeksRecord {
                delta: Some(0.52),
                ..GreeksRecord::default()
            }),
            implied_volatility: Some(0.31),
        };
        assert_relative_eq!(record.mid().unwrap(), 2.1);
        assert_eq!(record.delta(), Some(0.52));
        assert_eq!(record.gamma(), None);
        assert_eq!(record.strike(), Some(150.0));
        assert_eq!(record.last_price(), None);

        let mut one_sided = record;
        if let Some(q) = one_sided.latest_quote.as_mut() {
            q.bid_price = 0.0;
        }
        assert_eq!(one_sided.mid(), None);
    }
}
