//! Range command implementation.
//!
//! Resolves relative and explicit time inputs the same way the helpers do
//! and prints the resulting window.

use anyhow::Result;
use brokerkit_lib::{RangeQuery, ResolvedRange};
use chrono::{DateTime, Utc};

use crate::display::{format_bound, parse_instant};

/// Raw range arguments as given on the command line.
#[derive(Debug, Default)]
pub(crate) struct RangeArgs<'a> {
    pub(crate) period: Option<&'a str>,
    pub(crate) days_back: Option<u32>,
    pub(crate) hours_back: Option<u32>,
    pub(crate) start: Option<&'a str>,
    pub(crate) end: Option<&'a str>,
}

/// Resolve the window and print both bounds.
pub(crate) fn show_range(args: &RangeArgs<'_>) -> Result<()> {
    let range = resolve_args(args, Utc::now())?;
    println!("start: {}", format_bound(range.start));
    println!("end:   {}", format_bound(range.end));
    if let Some(duration) = range.duration() {
        println!("span:  {} hours", duration.num_hours());
    }
    Ok(())
}

fn resolve_args(args: &RangeArgs<'_>, now: DateTime<Utc>) -> Result<ResolvedRange> {
    let query = RangeQuery {
        period: args.period.map(str::to_string),
        days_back: args.days_back,
        hours_back: args.hours_back,
        start: args.start.map(parse_instant).transpose()?,
        end: args.end.map(parse_instant).transpose()?,
    };
    Ok(query.resolve(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 16, 0, 0).unwrap()
    }

    #[test]
    fn test_days_back() {
        let args = RangeArgs {
            days_back: Some(7),
            ..RangeArgs::default()
        };
        let range = resolve_args(&args, now()).unwrap();
        assert_eq!(range.start, Some(now() - TimeDelta::days(7)));
        assert_eq!(range.end, Some(now()));
    }

    #[test]
    fn test_explicit_start_only() {
        let args = RangeArgs {
            start: Some("2024-06-01"),
            ..RangeArgs::default()
        };
        let range = resolve_args(&args, now()).unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let args = RangeArgs {
            end: Some("June 1st"),
            ..RangeArgs::default()
        };
        assert!(resolve_args(&args, now()).is_err());
    }
}
