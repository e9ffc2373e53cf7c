//! Outbound retrieval of the manifest and variant pages.
//!
//! # Module Structure
//!
//! - `client` - pooled HTTPS client creation
//! - `http` - `PageFetcher` backed by the pooled client

mod client;
mod http;

pub use client::{create_http_client, HttpClient};
pub use http::HttpPageFetcher;

use crate::error::PipelineError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One manifest entry: either a bare URL (variant index inferred from its
/// trailing digit) or a URL with an explicit 0-based variant index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Url(String),
    Indexed { url: String, index: usize },
}

impl ManifestEntry {
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Indexed { url, .. } => url,
        }
    }

    pub fn explicit_index(&self) -> Option<usize> {
        match self {
            Self::Url(_) => None,
            Self::Indexed { index, .. } => Some(*index),
        }
    }
}

/// Body of the manifest endpoint: `{ "variants": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestResponse {
    pub variants: Vec<ManifestEntry>,
}

impl ManifestResponse {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: urls
                .into_iter()
                .map(|url| ManifestEntry::Url(url.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn find(&self, url: &str) -> Option<&ManifestEntry> {
        self.variants.iter().find(|entry| entry.url() == url)
    }

    /// Decode a manifest body fetched from `url` with upstream `status`.
    pub fn parse(url: &str, status: u16, body: &[u8]) -> Result<Self, PipelineError> {
        serde_json::from_slice(body).map_err(|e| {
            PipelineError::upstream(url, Some(status), format!("invalid manifest JSON: {e}"))
        })
    }
}

/// Source of manifests and variant pages.
///
/// Both operations succeed only on a 2xx upstream status and report the
/// upstream status unchanged on failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_manifest(&self) -> Result<ManifestResponse, PipelineError>;

    async fn fetch_variant_page(&self, url: &str) -> Result<Bytes, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_manifest() {
        let body = br#"{"variants":["https://x/variants/1","https://x/variants/2"]}"#;
        let manifest = ManifestResponse::parse("https://x/api", 200, body).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.variants[1].url(), "https://x/variants/2");
        assert_eq!(manifest.variants[1].explicit_index(), None);
    }

    #[test]
    fn test_parse_indexed_manifest() {
        let body = br#"{"variants":[{"url":"https://x/blue","index":1},"https://x/page1"]}"#;
        let manifest = ManifestResponse::parse("https://x/api", 200, body).unwrap();
        assert_eq!(
            manifest.variants[0],
            ManifestEntry::Indexed {
                url: "https://x/blue".to_string(),
                index: 1
            }
        );
        assert_eq!(manifest.variants[0].explicit_index(), Some(1));
        assert_eq!(manifest.variants[1].url(), "https://x/page1");
    }

    #[test]
    fn test_parse_malformed_manifest_carries_status() {
        let err = ManifestResponse::parse("https://x/api", 200, b"<html>").unwrap_err();
        match err {
            PipelineError::UpstreamFetchFailure { status, url, .. } => {
                assert_eq!(status, Some(200));
                assert_eq!(url, "https://x/api");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_variants_field_fails() {
        assert!(ManifestResponse::parse("https://x/api", 200, b"{}").is_err());
    }

    #[test]
    fn test_find_by_url() {
        let manifest = ManifestResponse::from_urls(["https://x/page1", "https://x/page2"]);
        assert!(manifest.find("https://x/page2").is_some());
        assert!(manifest.find("https://evil/page2").is_none());
    }
}
