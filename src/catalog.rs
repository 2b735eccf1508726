use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::BASE_DOMAIN_SUFFIX;
use crate::regions::Region;

/// A probe destination: either a provider shorthand (`aws`) or a region slug
/// (`aws-us-east-2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public hostname, as shown to users.
    pub fn hostname(&self) -> String {
        format!("{}{}", self.0, BASE_DOMAIN_SUFFIX)
    }

    /// Fully-qualified name with a trailing dot, so the resolver skips search domains.
    pub fn fqdn(&self) -> String {
        format!("{}.", self.hostname())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-level endpoints are "optimized", region endpoints are "direct".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Direct,
    Optimized,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Direct => write!(f, "direct"),
            EndpointKind::Optimized => write!(f, "optimized"),
        }
    }
}

/// The set of endpoints derived from one region snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    providers: BTreeSet<String>,
    targets: BTreeSet<Target>,
}

impl Catalog {
    pub fn from_regions(regions: &[Region]) -> Self {
        let mut providers = BTreeSet::new();
        let mut targets = BTreeSet::new();

        for region in regions {
            let provider = region.provider.to_lowercase();
            targets.insert(Target::new(provider.clone()));
            targets.insert(Target::new(region.slug.clone()));
            providers.insert(provider);
        }

        Self { providers, targets }
    }

    pub fn providers(&self) -> &BTreeSet<String> {
        &self.providers
    }

    /// Targets in a stable (lexicographic) order.
    pub fn targets(&self) -> Vec<Target> {
        self.targets.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn classify(&self, target: &Target) -> EndpointKind {
        if self.providers.contains(target.as_str()) {
            EndpointKind::Optimized
        } else {
            EndpointKind::Direct
        }
    }
}
