use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, trace};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::catalog::Target;
use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, PROBE_PORT};
use crate::ping::network::ProbeNetwork;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Budget for a whole probe, resolution and connect together.
    pub timeout: Duration,
    /// Maximum number of probes in flight at once.
    pub concurrency: usize,
}

impl ProbeConfig {
    pub fn new(timeout: Option<Duration>, concurrency: Option<usize>) -> Self {
        Self {
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            concurrency: concurrency
                .unwrap_or(DEFAULT_CONCURRENCY)
                .clamp(1, Semaphore::MAX_PERMITS),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("unable to resolve: {0}")]
    Resolve(String),
    #[error("unable to resolve: no addresses returned")]
    NoAddresses,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Result of probing one target. Failed probes carry the configured timeout
/// as their latency so they sort after every successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target: Target,
    pub latency: Duration,
    pub error: Option<ProbeError>,
}

impl ProbeOutcome {
    pub fn success(target: Target, latency: Duration) -> Self {
        Self {
            target,
            latency,
            error: None,
        }
    }

    pub fn failure(target: Target, timeout: Duration, error: ProbeError) -> Self {
        Self {
            target,
            latency: timeout,
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

pub struct Prober<N> {
    network: Arc<N>,
    config: ProbeConfig,
    progress: Span,
}

impl<N: ProbeNetwork> Prober<N> {
    pub fn new(network: N, config: ProbeConfig) -> Self {
        Self {
            network: Arc::new(network),
            config,
            progress: Span::none(),
        }
    }

    /// Advances the progress bar attached to `progress` once per collected outcome.
    pub fn with_progress(mut self, progress: Span) -> Self {
        self.progress = progress;
        self
    }

    /// Probes every target with at most `concurrency` probes in flight.
    ///
    /// `cancel` is checked only at admission: once it fires, no further targets
    /// are started, but probes already admitted still run to completion (bounded
    /// by their own timeout) and are included in the result. Outcomes come back
    /// in completion order.
    pub async fn probe(&self, targets: &[Target], cancel: &CancellationToken) -> Vec<ProbeOutcome> {
        let gate = Arc::new(Semaphore::new(self.config.concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<ProbeOutcome>();
        let mut admitted = 0usize;

        for target in targets {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(admitted, remaining = targets.len() - admitted, "Probing cancelled");
                    break;
                }
                permit = Arc::clone(&gate).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            admitted += 1;

            let network = Arc::clone(&self.network);
            let target = target.clone();
            let timeout = self.config.timeout;
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = probe_target(network.as_ref(), target, timeout).await;
                drop(permit);
                // Receiver lives until every sender is gone.
                let _ = tx.send(outcome);
            });
        }

        // Drop our sender so the loop below ends once every worker has reported.
        drop(tx);

        let mut outcomes = Vec::with_capacity(admitted);
        while let Some(outcome) = rx.recv().await {
            self.progress.pb_inc(1);
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Resolves and connects to one target under a single deadline.
pub async fn probe_target<N: ProbeNetwork>(
    network: &N,
    target: Target,
    timeout: Duration,
) -> ProbeOutcome {
    let fqdn = target.fqdn();

    match tokio::time::timeout(timeout, measure_connect(network, &fqdn)).await {
        Ok(Ok(latency)) => {
            trace!(%target, ?latency, "Probe succeeded");
            ProbeOutcome::success(target, latency.min(timeout))
        }
        Ok(Err(error)) => {
            debug!(%target, %error, "Probe failed");
            ProbeOutcome::failure(target, timeout, error)
        }
        Err(_) => {
            debug!(%target, ?timeout, "Probe timed out");
            ProbeOutcome::failure(target, timeout, ProbeError::TimedOut(timeout))
        }
    }
}

/// Only the connect step is timed; resolution shares the deadline but not the measurement.
/// The first resolved address is the only one tried.
async fn measure_connect<N: ProbeNetwork>(network: &N, host: &str) -> Result<Duration, ProbeError> {
    let addrs = network
        .resolve(host)
        .await
        .map_err(|e| ProbeError::Resolve(e.to_string()))?;
    let ip = addrs.first().copied().ok_or(ProbeError::NoAddresses)?;

    let start = Instant::now();
    network
        .connect(SocketAddr::new(ip, PROBE_PORT))
        .await
        .map_err(|e| ProbeError::Connect(e.to_string()))?;
    Ok(start.elapsed())
}
