//! Display utilities and output formatting for the brokerkit CLI.

use std::io::Write;

use anyhow::{Context, Result, bail};
use brokerkit_lib::{DomainRecord, to_timestamp};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;

/// Output format for normalized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Json,
    Ndjson,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write records in the specified format.
pub(crate) fn write_records(
    records: &[DomainRecord],
    format: Format,
    pretty: bool,
    mut writer: impl Write,
) -> Result<()> {
    match format {
        Format::Json if pretty => serde_json::to_writer_pretty(&mut writer, records)?,
        Format::Json => serde_json::to_writer(&mut writer, records)?,
        Format::Ndjson => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
    }
    if format == Format::Json {
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse a command-line instant: RFC 3339, a naive date-time (UTC) or a date.
pub(crate) fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    let value = serde_json::Value::String(text.to_string());
    to_timestamp(&value).with_context(|| {
        format!("Invalid date/time: {text}. Use YYYY-MM-DD or RFC 3339 (2024-01-02T14:30:00Z)")
    })
}

/// Render an optional bound, `open` when absent.
pub(crate) fn format_bound(bound: Option<DateTime<Utc>>) -> String {
    bound.map_or_else(
        || "open".to_string(),
        |instant| instant.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Map the `-v` count to a default log directive.
pub(crate) const fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Reject an empty selection with a readable message.
pub(crate) fn ensure_non_empty<T>(items: &[T], what: &str) -> Result<()> {
    if items.is_empty() {
        bail!("No {what} found in input");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_instant() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_instant("2024-01-02").unwrap(), expected);
        assert_eq!(parse_instant("2024-01-02T00:00:00Z").unwrap(), expected);
        assert!(parse_instant("last tuesday").is_err());
    }

    #[test]
    fn test_format_bound() {
        assert_eq!(format_bound(None), "open");
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        assert_eq!(format_bound(Some(instant)), "2024-01-02T14:30:00Z");
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, false), "warn");
        assert_eq!(log_level(2, false), "debug");
        assert_eq!(log_level(9, false), "trace");
        assert_eq!(log_level(3, true), "error");
    }
}
