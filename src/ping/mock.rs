//! Scripted network for exercising the prober without sockets.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::catalog::Target;
use crate::ping::network::ProbeNetwork;

/// How the mock answers a connect to an address.
#[derive(Debug, Clone)]
pub enum Reply {
    Instant,
    After(Duration),
    Refuse,
    Hang,
}

impl Reply {
    pub fn after(latency: Duration) -> Self {
        Reply::After(latency)
    }
}

#[derive(Default)]
pub struct MockNetwork {
    addresses: HashMap<String, Vec<IpAddr>>,
    resolve_delays: HashMap<String, Duration>,
    replies: HashMap<IpAddr, Reply>,
    cancel_after: Option<(usize, CancellationToken)>,
    next_ip: u32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    resolves: AtomicUsize,
    connects: AtomicUsize,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, reply: Reply) -> IpAddr {
        self.next_ip += 1;
        let ip = IpAddr::V4(Ipv4Addr::from(0x0a00_0000 + self.next_ip));
        self.replies.insert(ip, reply);
        ip
    }

    pub fn host(mut self, key: &str, reply: Reply) -> Self {
        let ip = self.allocate(reply);
        self.addresses.insert(Target::new(key).fqdn(), vec![ip]);
        self
    }

    pub fn host_with_fallback(mut self, key: &str, first: Reply, second: Reply) -> Self {
        let first = self.allocate(first);
        let second = self.allocate(second);
        self.addresses
            .insert(Target::new(key).fqdn(), vec![first, second]);
        self
    }

    pub fn host_without_addresses(mut self, key: &str) -> Self {
        self.addresses.insert(Target::new(key).fqdn(), Vec::new());
        self
    }

    pub fn resolve_delay(mut self, key: &str, delay: Duration) -> Self {
        self.resolve_delays.insert(Target::new(key).fqdn(), delay);
        self
    }

    /// Cancels `token` as soon as `count` resolutions have started.
    pub fn cancel_after_resolves(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Network operations currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

/// Counts one running operation; released on completion or when the
/// operation's future is dropped by a timeout.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProbeNetwork for MockNetwork {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let started = self.resolves.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = self.enter();

        if let Some((count, token)) = &self.cancel_after
            && started >= *count
        {
            token.cancel();
        }

        if let Some(delay) = self.resolve_delays.get(host) {
            tokio::time::sleep(*delay).await;
        }

        match self.addresses.get(host) {
            Some(addrs) => Ok(addrs.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such host: {host}"),
            )),
        }
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let _in_flight = self.enter();
        let reply = self.replies.get(&addr.ip()).cloned().unwrap_or(Reply::Refuse);

        match reply {
            Reply::Instant => Ok(()),
            Reply::After(latency) => {
                tokio::time::sleep(latency).await;
                Ok(())
            }
            Reply::Refuse => Err(io::Error::from(io::ErrorKind::ConnectionRefused)),
            Reply::Hang => std::future::pending().await,
        }
    }
}
