use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use colored::Colorize as _;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EndpointKind};
use crate::ping::{ProbeConfig, ProbeOutcome};
use crate::utils::format::format_duration;

pub use row::*;

mod row;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingReport {
    /// Probe configuration the report was produced with
    pub config: ProbeConfig,
    /// Rows sorted by ascending latency, failures last
    pub rows: Vec<ReportRow>,
    /// Number of targets that were never probed because the run was cancelled
    pub skipped: usize,
    pub timestamp: DateTime<Utc>,
}

impl PingReport {
    pub fn new(
        config: ProbeConfig,
        outcomes: &[ProbeOutcome],
        catalog: &Catalog,
        skipped: usize,
    ) -> Self {
        Self {
            config,
            rows: to_rows(outcomes, catalog),
            skipped,
            timestamp: Utc::now(),
        }
    }

    pub fn reachable(&self) -> usize {
        self.rows.iter().filter(|r| r.is_reachable()).count()
    }

    pub fn failed(&self) -> usize {
        self.rows.len() - self.reachable()
    }

    /// The lowest-latency reachable endpoint, if any.
    pub fn fastest(&self) -> Option<&ReportRow> {
        self.rows.first().filter(|r| r.is_reachable())
    }
}

impl Display for PingReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.endpoint.len())
            .max()
            .unwrap_or(0)
            .max("ENDPOINT".len());

        writeln!(
            f,
            "{}",
            format!("{:<width$}  {:>10}  TYPE", "ENDPOINT", "LATENCY").bold()
        )?;

        for row in &self.rows {
            let latency = format!("{:>10}", row.latency);
            let latency = if row.is_reachable() {
                latency.green()
            } else {
                latency.red()
            };
            let kind = match row.kind {
                EndpointKind::Optimized => row.kind.to_string().cyan(),
                EndpointKind::Direct => row.kind.to_string().normal(),
            };
            writeln!(f, "{:<width$}  {latency}  {kind}", row.endpoint)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{} reachable, {} failed (timeout {}, concurrency {})",
            self.reachable().to_string().green(),
            self.failed().to_string().red(),
            format_duration(self.config.timeout),
            self.config.concurrency
        )?;
        if self.skipped > 0 {
            writeln!(
                f,
                "{}",
                format!("{} endpoints skipped after cancellation", self.skipped).yellow()
            )?;
        }
        if let Some(fastest) = self.fastest() {
            writeln!(
                f,
                "Fastest: {} ({})",
                fastest.endpoint.bold(),
                fastest.latency
            )?;
        }
        Ok(())
    }
}
