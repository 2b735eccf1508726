use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EndpointKind};
use crate::constants::{FAILED_LATENCY_PLACEHOLDER, LATENCY_RESOLUTION};
use crate::ping::ProbeOutcome;
use crate::utils::format::{format_duration, truncate_duration};

/// One line of the ping report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub endpoint: String,
    pub latency: String,
    #[serde(rename = "type")]
    pub kind: EndpointKind,
}

impl ReportRow {
    pub fn from_outcome(outcome: &ProbeOutcome, catalog: &Catalog) -> Self {
        let latency = if outcome.is_failure() {
            FAILED_LATENCY_PLACEHOLDER.to_string()
        } else {
            format_duration(truncate_duration(outcome.latency, LATENCY_RESOLUTION))
        };

        Self {
            endpoint: outcome.target.hostname(),
            latency,
            kind: catalog.classify(&outcome.target),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.latency != FAILED_LATENCY_PLACEHOLDER
    }
}

/// Maps already sorted outcomes to rows, keeping their order.
pub fn to_rows(outcomes: &[ProbeOutcome], catalog: &Catalog) -> Vec<ReportRow> {
    outcomes
        .iter()
        .map(|outcome| ReportRow::from_outcome(outcome, catalog))
        .collect()
}
