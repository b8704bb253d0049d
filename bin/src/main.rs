//! brokerkit CLI - timeframes, time ranges and record normalization.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::normalize::NormalizeArgs;
use commands::range::RangeArgs;
use display::Format;

#[derive(Parser)]
#[command(name = "brokerkit")]
#[command(about = "Brokerage market-data convenience toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a timeframe code (e.g. 1Min, 4h, 1Day)
    Timeframe {
        /// Timeframe text
        text: String,
    },

    /// Resolve a time window from relative or explicit inputs
    Range {
        /// Named period (1D, 1W, 1M, 3M, 1A, all)
        #[arg(short, long)]
        period: Option<String>,

        /// Days before the end
        #[arg(long)]
        days_back: Option<u32>,

        /// Hours before the end
        #[arg(long)]
        hours_back: Option<u32>,

        /// Explicit start (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        start: Option<String>,

        /// Explicit end (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Normalize saved upstream JSON into typed records
    Normalize {
        /// Record shape (bar, quote, trade, snapshot, account, ...)
        #[arg(short, long)]
        shape: String,

        /// Input file. Reads stdin when omitted.
        input: Option<PathBuf>,

        /// Output file. Writes stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input is an object keyed by symbol
        #[arg(short, long)]
        keyed: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List record shapes, or show the fields of one
    Shapes {
        /// Shape name
        name: Option<String>,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(display::log_level(verbose, quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Timeframe { text } => commands::timeframe::show_timeframe(&text),
        Commands::Range {
            period,
            days_back,
            hours_back,
            start,
            end,
        } => commands::range::show_range(&RangeArgs {
            period: period.as_deref(),
            days_back,
            hours_back,
            start: start.as_deref(),
            end: end.as_deref(),
        }),
        Commands::Normalize {
            shape,
            input,
            output,
            keyed,
            format,
            pretty,
        } => commands::normalize::normalize_command(&NormalizeArgs {
            shape: &shape,
            input: input.as_deref(),
            output: output.as_deref(),
            keyed,
            format,
            pretty,
        }),
        Commands::Shapes { name } => commands::shapes::show_shapes(name.as_deref()),
    }
}
