//! Time range resolution from relative and explicit query inputs.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named lookback period accepted by range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// One calendar day.
    #[serde(rename = "1D")]
    OneDay,
    /// Seven days.
    #[serde(rename = "1W")]
    OneWeek,
    /// Thirty days.
    #[serde(rename = "1M")]
    OneMonth,
    /// Ninety days.
    #[serde(rename = "3M")]
    ThreeMonths,
    /// 365 days.
    #[serde(rename = "1A")]
    OneYear,
    /// No lower bound.
    #[serde(rename = "all")]
    All,
}

impl Period {
    /// Returns the lookback, or `None` for [`Period::All`].
    #[must_use]
    pub fn lookback(&self) -> Option<TimeDelta> {
        match self {
            Self::OneDay => Some(TimeDelta::days(1)),
            Self::OneWeek => Some(TimeDelta::days(7)),
            Self::OneMonth => Some(TimeDelta::days(30)),
            Self::ThreeMonths => Some(TimeDelta::days(90)),
            Self::OneYear => Some(TimeDelta::days(365)),
            Self::All => None,
        }
    }

    /// Returns the period code as sent upstream.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1A",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1D" => Ok(Self::OneDay),
            "1W" => Ok(Self::OneWeek),
            "1M" => Ok(Self::OneMonth),
            "3M" => Ok(Self::ThreeMonths),
            "1A" => Ok(Self::OneYear),
            "ALL" => Ok(Self::All),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

/// Error returned for a period code outside the supported table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period '{0}', expected one of: 1D, 1W, 1M, 3M, 1A, all")]
pub struct UnknownPeriod(String);

/// Concrete request window. `None` on a side leaves it to the upstream default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// Inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl ResolvedRange {
    /// A range with neither bound set.
    pub const OPEN: Self = Self {
        start: None,
        end: None,
    };

    /// Returns true if neither bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Returns the window length when both bounds are known.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = |bound: Option<DateTime<Utc>>| {
            bound.map_or_else(|| "open".to_string(), |ts| ts.to_rfc3339())
        };
        write!(f, "{} to {}", side(self.start), side(self.end))
    }
}

/// Loosely specified time window, as accepted by the helper methods.
///
/// Any combination of fields may be set; [`RangeQuery::resolve`] applies the
/// precedence rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Period code (`1D`, `1W`, `1M`, `3M`, `1A`, `all`).
    pub period: Option<String>,
    /// Days back from the anchor.
    pub days_back: Option<u32>,
    /// Hours back from the anchor.
    pub hours_back: Option<u32>,
    /// Explicit lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Explicit upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl RangeQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the period code.
    #[must_use]
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Sets the days-back lookback.
    #[must_use]
    pub const fn days_back(mut self, days: u32) -> Self {
        self.days_back = Some(days);
        self
    }

    /// Sets the hours-back lookback.
    #[must_use]
    pub const fn hours_back(mut self, hours: u32) -> Self {
        self.hours_back = Some(hours);
        self
    }

    /// Sets the explicit lower bound.
    #[must_use]
    pub const fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the explicit upper bound.
    #[must_use]
    pub const fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.period.is_none()
            && self.days_back.is_none()
            && self.hours_back.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// Resolves the query against `now`.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> ResolvedRange {
        resolve(
            self.period.as_deref(),
            self.days_back,
            self.hours_back,
            self.start,
            self.end,
            now,
        )
    }
}

/// Start-side input that won precedence.
enum Lookback {
    Unbounded,
    Delta(TimeDelta),
}

/// Resolves a time window from explicit and relative inputs.
///
/// Explicit `start`/`end` always win for their side. For the start side the
/// relative inputs are consulted in order: `period = "all"` (no lower bound),
/// `days_back`, `hours_back`, then the period table. A relative start is
/// measured back from the explicit `end` when one is given, else from `now`;
/// the end side defaults to `now` whenever a relative input is in effect.
/// Unknown period codes are ignored.
///
/// Never fails. A computed end that would precede an explicit start is
/// dropped, and explicit bounds given in reverse order are swapped.
#[must_use]
pub fn resolve(
    period: Option<&str>,
    days_back: Option<u32>,
    hours_back: Option<u32>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ResolvedRange {
    let period = period.and_then(|code| match code.parse::<Period>() {
        Ok(period) => Some(period),
        Err(err) => {
            tracing::warn!(%err, "ignoring period");
            None
        }
    });

    let lookback = if period == Some(Period::All) {
        Some(Lookback::Unbounded)
    } else if let Some(days) = days_back {
        Some(Lookback::Delta(TimeDelta::days(i64::from(days))))
    } else if let Some(hours) = hours_back {
        Some(Lookback::Delta(TimeDelta::hours(i64::from(hours))))
    } else {
        period.and_then(|p| p.lookback()).map(Lookback::Delta)
    };

    let Some(lookback) = lookback else {
        return ordered(start, end);
    };

    let anchor = end.unwrap_or(now);
    let resolved_start = match (start, lookback) {
        (Some(explicit), _) => Some(explicit),
        (None, Lookback::Unbounded) => None,
        (None, Lookback::Delta(delta)) => {
            let start = anchor.checked_sub_signed(delta);
            if start.is_none() {
                tracing::warn!(%anchor, lookback = %delta, "lookback out of range, leaving start open");
            }
            start
        }
    };

    match end {
        Some(explicit) => ordered(resolved_start, Some(explicit)),
        None => {
            let computed_end = match resolved_start {
                Some(s) if s > now => {
                    tracing::warn!(start = %s, "explicit start is in the future, leaving end open");
                    None
                }
                _ => Some(now),
            };
            ResolvedRange {
                start: resolved_start,
                end: computed_end,
            }
        }
    }
}

fn ordered(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> ResolvedRange {
    match (start, end) {
        (Some(s), Some(e)) if s > e => {
            tracing::warn!(start = %s, end = %e, "swapping reversed range bounds");
            ResolvedRange {
                start: Some(e),
                end: Some(s),
            }
        }
        _ => ResolvedRange { start, end },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 15, 30, 0).unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_days_back() {
        let range = RangeQuery::new().days_back(7).resolve(now());
        assert_eq!(range.start, Some(now() - TimeDelta::days(7)));
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn test_hours_back() {
        let range = RangeQuery::new().hours_back(2).resolve(now());
        assert_eq!(range.start, Some(now() - TimeDelta::hours(2)));
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn test_explicit_start_alone_leaves_end_open() {
        let range = RangeQuery::new().start(at(1)).resolve(now());
        assert_eq!(range, ResolvedRange { start: Some(at(1)), end: None });
    }

    #[test]
    fn test_explicit_end_alone() {
        let range = RangeQuery::new().end(at(10)).resolve(now());
        assert_eq!(range, ResolvedRange { start: None, end: Some(at(10)) });
    }

    #[test]
    fn test_nothing_is_open() {
        let range = RangeQuery::new().resolve(now());
        assert!(range.is_open());
        assert_eq!(range, ResolvedRange::OPEN);
    }

    #[test]
    fn test_explicit_start_beats_days_back() {
        let range = RangeQuery::new().days_back(7).start(at(1)).resolve(now());
        assert_eq!(range.start, Some(at(1)));
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn test_pinned_end_anchors_days_back() {
        let range = RangeQuery::new().days_back(3).end(at(10)).resolve(now());
        assert_eq!(range.start, Some(at(7)));
        assert_eq!(range.end, Some(at(10)));
    }

    #[test]
    fn test_period_all_has_no_lower_bound() {
        let range = RangeQuery::new()
            .period("all")
            .days_back(7)
            .hours_back(3)
            .resolve(now());
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn test_period_all_keeps_explicit_start() {
        let range = RangeQuery::new().period("all").start(at(2)).resolve(now());
        assert_eq!(range.start, Some(at(2)));
    }

    #[test]
    fn test_period_table() {
        let cases = [("1D", 1), ("1W", 7), ("1M", 30), ("3M", 90), ("1A", 365), ("1w", 7)];
        for (code, days) in cases {
            let range = RangeQuery::new().period(code).resolve(now());
            assert_eq!(range.start, Some(now() - TimeDelta::days(days)), "{code}");
            assert_eq!(range.end, Some(now()));
        }
    }

    #[test]
    fn test_relative_precedence() {
        let range = RangeQuery::new()
            .period("1A")
            .days_back(2)
            .hours_back(5)
            .resolve(now());
        assert_eq!(range.start, Some(now() - TimeDelta::days(2)));

        let range = RangeQuery::new().period("1A").hours_back(5).resolve(now());
        assert_eq!(range.start, Some(now() - TimeDelta::hours(5)));
    }

    #[test]
    fn test_unknown_period_is_ignored() {
        let range = RangeQuery::new().period("5Y").resolve(now());
        assert!(range.is_open());

        let range = RangeQuery::new().period("5Y").end(at(3)).resolve(now());
        assert_eq!(range, ResolvedRange { start: None, end: Some(at(3)) });
    }

    #[test]
    fn test_reversed_explicit_bounds_are_swapped() {
        let range = RangeQuery::new().start(at(10)).end(at(2)).resolve(now());
        assert_eq!(range, ResolvedRange { start: Some(at(2)), end: Some(at(10)) });
    }

    #[test]
    fn test_future_start_drops_computed_end() {
        let future = now() + TimeDelta::days(3);
        let range = RangeQuery::new().days_back(1).start(future).resolve(now());
        assert_eq!(range, ResolvedRange { start: Some(future), end: None });
    }

    #[test]
    fn test_start_never_after_end() {
        let queries = [
            RangeQuery::new().days_back(0),
            RangeQuery::new().hours_back(1).end(at(1)),
            RangeQuery::new().period("3M").start(at(20)),
            RangeQuery::new().start(at(13)).end(at(12)),
        ];
        for query in queries {
            let range = query.resolve(now());
            if let (Some(s), Some(e)) = (range.start, range.end) {
                assert!(s <= e, "{query:?} resolved to {range}");
            }
        }
    }

    #[test]
    fn test_lookback_past_earliest_instant_leaves_start_open() {
        let range = RangeQuery::new().days_back(u32::MAX).resolve(now());
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(now()));

        let range = RangeQuery::new().days_back(200_000_000).resolve(now());
        assert_eq!(range.start, None);

        let range = RangeQuery::new().hours_back(u32::MAX).resolve(now());
        assert!(range.start.is_none_or(|s| s <= now()));
        assert_eq!(range.end, Some(now()));

        let range = RangeQuery::new()
            .days_back(1)
            .end(DateTime::<Utc>::MIN_UTC)
            .resolve(now());
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_free_function_matches_query() {
        let direct = resolve(Some("1W"), None, None, None, Some(at(12)), now());
        let query = RangeQuery::new().period("1W").end(at(12)).resolve(now());
        assert_eq!(direct, query);
        assert_eq!(direct.duration(), Some(TimeDelta::days(7)));
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert_eq!(" 3m ".parse::<Period>().unwrap(), Period::ThreeMonths);
        assert!("2W".parse::<Period>().is_err());
        assert_eq!(Period::OneYear.to_string(), "1A");
    }
}
