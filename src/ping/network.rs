use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpStream;
use tracing::{trace, warn};
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};

/// Network operations a probe performs. Split out so probing can run against
/// a scripted network in tests.
pub trait ProbeNetwork: Send + Sync + 'static {
    /// Resolves `host` to its addresses, in resolver order.
    fn resolve(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;

    /// Opens a TCP connection to `addr` and closes it again without exchanging data.
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = io::Result<()>> + Send;
}

/// Real network: system resolver configuration plus plain TCP.
#[derive(Clone)]
pub struct SystemNetwork {
    resolver: TokioAsyncResolver,
}

impl SystemNetwork {
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!("Could not read system resolver configuration ({e}), using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

impl Default for SystemNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeNetwork for SystemNetwork {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let lookup = self.resolver.lookup_ip(host).await.map_err(io::Error::other)?;
        let addrs: Vec<IpAddr> = lookup.iter().collect();
        trace!(host, ?addrs, "Resolved");
        Ok(addrs)
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        let stream = TcpStream::connect(addr).await?;
        drop(stream);
        Ok(())
    }
}
