use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::REGION_LISTING_TIMEOUT;

/// A region as returned by the region-listing API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub slug: String,
    pub provider: String,
}

#[cfg(test)]
impl Region {
    pub fn new(slug: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            provider: provider.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegionSourceError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid region listing: {0}")]
    Invalid(String),
}

/// Anything able to produce the current region snapshot.
pub trait RegionSource {
    fn list_regions(&self) -> impl Future<Output = Result<Vec<Region>, RegionSourceError>> + Send;
}

/// The listing API either returns a bare array or wraps it in a `data` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum RegionListing {
    Bare(Vec<Region>),
    Paged { data: Vec<Region> },
}

impl From<RegionListing> for Vec<Region> {
    fn from(listing: RegionListing) -> Self {
        match listing {
            RegionListing::Bare(regions) => regions,
            RegionListing::Paged { data } => data,
        }
    }
}

/// Parses and validates a region listing document.
pub fn parse_regions(json: &str) -> Result<Vec<Region>, RegionSourceError> {
    let listing: RegionListing = serde_json::from_str(json)?;
    let regions: Vec<Region> = listing.into();

    if let Some(region) = regions
        .iter()
        .find(|r| r.slug.trim().is_empty() || r.provider.trim().is_empty())
    {
        return Err(RegionSourceError::Invalid(format!(
            "region with empty slug or provider: {region:?}"
        )));
    }

    Ok(regions)
}

#[derive(Debug, Clone)]
pub struct FileRegionSource {
    path: PathBuf,
}

impl FileRegionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegionSource for FileRegionSource {
    async fn list_regions(&self) -> Result<Vec<Region>, RegionSourceError> {
        debug!(path = %self.path.display(), "Reading region listing");
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_regions(&content)
    }
}

#[derive(Debug, Clone)]
pub struct HttpRegionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRegionSource {
    pub fn new(url: impl Into<String>) -> Result<Self, RegionSourceError> {
        Self::with_timeout(url, REGION_LISTING_TIMEOUT)
    }

    /// `timeout` bounds the whole request, from connect to the end of the body.
    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RegionSourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl RegionSource for HttpRegionSource {
    async fn list_regions(&self) -> Result<Vec<Region>, RegionSourceError> {
        debug!(url = %self.url, "Fetching region listing");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_regions(&body)
    }
}

/// Either kind of source, picked from a user supplied location.
#[derive(Debug, Clone)]
pub enum AnyRegionSource {
    File(FileRegionSource),
    Http(HttpRegionSource),
}

pub fn source_for(location: &str) -> Result<AnyRegionSource, RegionSourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(AnyRegionSource::Http(HttpRegionSource::new(location)?))
    } else {
        Ok(AnyRegionSource::File(FileRegionSource::new(location)))
    }
}

impl RegionSource for AnyRegionSource {
    async fn list_regions(&self) -> Result<Vec<Region>, RegionSourceError> {
        match self {
            AnyRegionSource::File(source) => source.list_regions().await,
            AnyRegionSource::Http(source) => source.list_regions().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_listing() {
        let regions =
            parse_regions(r#"[{"slug": "aws-us-east-2", "provider": "AWS"}]"#).unwrap();
        assert_eq!(regions, vec![Region::new("aws-us-east-2", "AWS")]);
    }

    #[test]
    fn test_parse_paged_listing() {
        let json = r#"{"data": [
            {"slug": "aws-us-east-2", "provider": "AWS", "display_name": "Ohio"},
            {"slug": "gcp-us-central1", "provider": "GCP"}
        ]}"#;
        let regions = parse_regions(json).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].slug, "gcp-us-central1");
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_regions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_blank_fields() {
        let err = parse_regions(r#"[{"slug": "", "provider": "aws"}]"#).unwrap_err();
        assert!(matches!(err, RegionSourceError::Invalid(_)));
    }

    #[test]
    fn test_source_for_location() {
        assert!(matches!(
            source_for("https://api.example.com/regions").unwrap(),
            AnyRegionSource::Http(_)
        ));
        assert!(matches!(
            source_for("regions.json").unwrap(),
            AnyRegionSource::File(_)
        ));
    }

    #[tokio::test]
    async fn test_file_source_reads_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        std::fs::write(&path, r#"[{"slug": "aws-eu-west-1", "provider": "aws"}]"#).unwrap();

        let regions = FileRegionSource::new(&path).list_regions().await.unwrap();
        assert_eq!(regions, vec![Region::new("aws-eu-west-1", "aws")]);
    }

    /// Accepts connections and never answers them.
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("http://{addr}/regions")
    }

    #[tokio::test]
    async fn test_http_source_times_out_on_silent_server() {
        let url = silent_server().await;
        let source = HttpRegionSource::with_timeout(url, Duration::from_millis(200)).unwrap();

        let err = tokio::time::timeout(Duration::from_secs(5), source.list_regions())
            .await
            .expect("listing should give up on its own")
            .unwrap_err();
        assert!(matches!(err, RegionSourceError::Http(e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileRegionSource::new(dir.path().join("nope.json"))
            .list_regions()
            .await
            .unwrap_err();
        assert!(matches!(err, RegionSourceError::IO(_)));
    }
}
