use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;

use crate::constants::DEFAULT_CONCURRENCY;
use crate::utils::types::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every endpoint and print them ordered by latency
    Ping {
        /// Region listing: a JSON file path or an http(s) URL
        #[arg(short, long)]
        regions: String,

        /// Per-endpoint timeout covering DNS and connect (e.g. 500ms, 3s)
        #[arg(short, long, value_parser = parse_timeout, default_value = "3s")]
        timeout: Duration,

        /// Maximum number of endpoints probed at once
        #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Export the report to a JSON file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

/// Accepts `250ms`, `3s`, `1m` or a bare number of seconds.
pub fn parse_timeout(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let (number, unit) = match value.find(|c: char| c.is_ascii_alphabetic()) {
        Some(idx) => value.split_at(idx),
        None => (value, "s"),
    };
    let number: f64 = number
        .parse()
        .map_err(|_| format!("invalid timeout: {value}"))?;
    if !number.is_finite() || number <= 0.0 {
        return Err(format!("timeout must be positive: {value}"));
    }

    let seconds = match unit {
        "ms" => number / 1000.0,
        "s" => number,
        "m" => number * 60.0,
        _ => return Err(format!("unknown timeout unit '{unit}' (use ms, s or m)")),
    };
    let timeout = Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("timeout out of range: {value}"))?;
    if timeout.is_zero() {
        return Err(format!("timeout rounds down to zero: {value}"));
    }
    Ok(timeout)
}
