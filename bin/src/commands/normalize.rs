//! Normalize command implementation.
//!
//! Reads saved upstream JSON (one record, a list, or records keyed by
//! symbol), normalizes every record with the chosen shape and writes the
//! results. Records that fail are reported on stderr and skipped.

use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::Path;

use anyhow::{Context, Result};
use brokerkit_lib::{DomainRecord, NormalizeError, RawResponse, RecordShape, normalize, normalize_keyed};

use crate::display::{Format, ensure_non_empty, write_records};

/// Normalized records plus the labelled failures.
#[derive(Debug, Default)]
struct Outcome {
    records: Vec<DomainRecord>,
    failures: Vec<(String, NormalizeError)>,
}

impl Outcome {
    fn push(&mut self, label: String, result: Result<DomainRecord, NormalizeError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(err) => self.failures.push((label, err)),
        }
    }

    const fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Command-line options for `normalize`.
#[derive(Debug)]
pub(crate) struct NormalizeArgs<'a> {
    pub(crate) shape: &'a str,
    pub(crate) input: Option<&'a Path>,
    pub(crate) output: Option<&'a Path>,
    pub(crate) keyed: bool,
    pub(crate) format: Format,
    pub(crate) pretty: bool,
}

/// Normalize a file (or stdin) and write the records to a file (or stdout).
pub(crate) fn normalize_command(args: &NormalizeArgs<'_>) -> Result<()> {
    let shape: RecordShape = args.shape.parse()?;
    let text = read_input(args.input)?;
    let outcome = normalize_text(&text, shape, args.keyed)?;

    for (label, err) in &outcome.failures {
        eprintln!("{label}: {err}");
    }
    if !outcome.failures.is_empty() {
        eprintln!(
            "{} of {} records failed to normalize",
            outcome.failures.len(),
            outcome.total()
        );
    }
    ensure_non_empty(&outcome.records, "valid records")?;

    match args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_records(&outcome.records, args.format, args.pretty, BufWriter::new(file))?;
            tracing::info!(records = outcome.records.len(), path = %path.display(), "records written");
        }
        None => write_records(&outcome.records, args.format, args.pretty, io::stdout().lock())?,
    }
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match input {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?
                .read_to_string(&mut text)?;
        }
        None => {
            io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
        }
    }
    Ok(text)
}

fn normalize_text(text: &str, shape: RecordShape, keyed: bool) -> Result<Outcome> {
    let value: serde_json::Value = serde_json::from_str(text).context("Input is not valid JSON")?;
    let response = RawResponse::from_value(value, keyed)?;
    tracing::debug!(layout = response.layout(), %shape, "normalizing input");

    let mut outcome = Outcome::default();
    match response {
        RawResponse::Item(item) => outcome.push("record".to_string(), normalize(&item, shape)),
        RawResponse::List(items) => {
            for (index, item) in items.iter().enumerate() {
                outcome.push(format!("record #{index}"), normalize(item, shape));
            }
        }
        RawResponse::BySymbol(map) => {
            for (symbol, payload) in map {
                for (index, item) in payload.into_items().iter().enumerate() {
                    outcome.push(
                        format!("{symbol} #{index}"),
                        normalize_keyed(&symbol, item, shape),
                    );
                }
            }
        }
    }
    Ok(outcome)
}
