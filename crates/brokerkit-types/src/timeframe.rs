//! Bar aggregation timeframe parsing.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Unit of a bar aggregation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeframeUnit {
    /// Minute bars.
    Minute,
    /// Hour bars.
    Hour,
    /// Daily bars.
    Day,
    /// Weekly bars.
    Week,
    /// Monthly bars.
    Month,
}

impl TimeframeUnit {
    /// Returns the upstream spelling of the unit (`Min`, `Hour`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "Min",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
        }
    }

    /// Returns all units, shortest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Minute, Self::Hour, Self::Day, Self::Week, Self::Month]
    }

    /// Resolves a lowercase unit token.
    ///
    /// `m` is reserved for months; minutes need `min` or a longer form.
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "min" | "mins" | "minute" | "minutes" => Some(Self::Minute),
            "h" | "hour" | "hours" => Some(Self::Hour),
            "d" | "day" | "days" => Some(Self::Day),
            "w" | "week" | "weeks" => Some(Self::Week),
            "m" | "month" | "months" => Some(Self::Month),
            _ => None,
        }
    }

    const fn approx_seconds(&self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
            Self::Week => 7 * 86_400,
            Self::Month => 30 * 86_400,
        }
    }
}

impl std::fmt::Display for TimeframeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical bar interval: a positive amount of a [`TimeframeUnit`].
///
/// Parsing discards the original spelling, so `"1H"`, `"1hour"` and
/// `" 1 Hours "` all produce the same value.
///
/// ```
/// use brokerkit_types::{TimeframeSpec, TimeframeUnit};
///
/// let tf: TimeframeSpec = "4H".parse().unwrap();
/// assert_eq!(tf, TimeframeSpec::new(4, TimeframeUnit::Hour).unwrap());
/// assert_eq!(tf.to_string(), "4Hour");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeframeSpec {
    amount: u32,
    unit: TimeframeUnit,
}

impl TimeframeSpec {
    /// One-minute bars.
    pub const MINUTE: Self = Self {
        amount: 1,
        unit: TimeframeUnit::Minute,
    };
    /// One-hour bars.
    pub const HOUR: Self = Self {
        amount: 1,
        unit: TimeframeUnit::Hour,
    };
    /// Daily bars.
    pub const DAY: Self = Self {
        amount: 1,
        unit: TimeframeUnit::Day,
    };

    /// Creates a timeframe, rejecting a zero amount.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is zero.
    pub fn new(amount: u32, unit: TimeframeUnit) -> Result<Self, TimeframeParseError> {
        if amount == 0 {
            return Err(TimeframeParseError::new(format!("0{unit}")));
        }
        Ok(Self { amount, unit })
    }

    /// Parses a human-friendly timeframe such as `"5Min"`, `"1H"` or `"Day"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, has no unit, has a zero or
    /// signed amount, or names an unknown unit.
    pub fn parse(text: &str) -> Result<Self, TimeframeParseError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let split = compact
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(compact.len());
        let (digits, token) = compact.split_at(split);

        if token.is_empty() {
            return Err(TimeframeParseError::new(text));
        }

        let amount = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| TimeframeParseError::new(text))?
        };

        let unit = TimeframeUnit::from_token(&token.to_ascii_lowercase())
            .ok_or_else(|| TimeframeParseError::new(text))?;

        Self::new(amount, unit).map_err(|_| TimeframeParseError::new(text))
    }

    /// Returns the number of units per bar.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Returns the unit.
    #[must_use]
    pub const fn unit(&self) -> TimeframeUnit {
        self.unit
    }

    /// Returns the approximate length of one bar (months count as 30 days).
    #[must_use]
    pub fn approx_duration(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.amount) * self.unit.approx_seconds())
    }
}

impl Default for TimeframeSpec {
    fn default() -> Self {
        Self::DAY
    }
}

impl std::fmt::Display for TimeframeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

impl FromStr for TimeframeSpec {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeframeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeframeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timeframe '{0}', expected an optional amount and a unit such as 1Min, 4H, 1D, 1W or 1M")]
pub struct TimeframeParseError(String);

impl TimeframeParseError {
    fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the text that failed to parse.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }
}
