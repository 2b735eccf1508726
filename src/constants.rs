use std::time::Duration;

/// Suffix appended to every target to form its public hostname.
pub const BASE_DOMAIN_SUFFIX: &str = ".connect.psdb.cloud";
/// Probes only open a TCP connection, they never speak TLS.
pub const PROBE_PORT: u16 = 443;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Upper bound for fetching the region listing over HTTP.
pub const REGION_LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Latency cells are truncated to this resolution before rendering.
pub const LATENCY_RESOLUTION: Duration = Duration::from_micros(100);
/// Shown in place of a latency when the probe failed.
pub const FAILED_LATENCY_PLACEHOLDER: &str = "---";
