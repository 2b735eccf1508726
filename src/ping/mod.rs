use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::catalog::Catalog;
use crate::regions::{RegionSource, RegionSourceError};
use crate::report::PingReport;

pub use aggregate::*;
pub use network::*;
pub use prober::*;

mod aggregate;
#[cfg(test)]
mod mock;
mod network;
mod prober;

#[derive(Debug, Error)]
pub enum PingError {
    #[error("failed to list regions: {0}")]
    Regions(#[from] RegionSourceError),
    #[error("cancelled while listing regions")]
    Cancelled,
}

/// Lists regions, probes every derived endpoint and builds the sorted report.
///
/// Only the region listing can fail, either on its own or because `cancel`
/// fired before it completed; per-endpoint failures end up as rows.
pub async fn run_ping<S, N>(
    source: &S,
    network: N,
    config: ProbeConfig,
    cancel: &CancellationToken,
    progress: Span,
) -> Result<PingReport, PingError>
where
    S: RegionSource,
    N: ProbeNetwork,
{
    let regions = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PingError::Cancelled),
        regions = source.list_regions() => regions?,
    };
    let catalog = Catalog::from_regions(&regions);
    if catalog.is_empty() {
        warn!("Region listing is empty, nothing to probe");
    }
    let targets = catalog.targets();
    info!(
        regions = regions.len(),
        providers = catalog.providers().len(),
        targets = targets.len(),
        "Built endpoint catalog"
    );

    progress.pb_set_length(targets.len() as u64);
    let prober = Prober::new(network, config).with_progress(progress);
    let outcomes = prober.probe(&targets, cancel).await;

    let skipped = targets.len() - outcomes.len();
    debug!(probed = outcomes.len(), skipped, "Probing finished");

    let outcomes = aggregate(outcomes);
    Ok(PingReport::new(config, &outcomes, &catalog, skipped))
}
