//! `PageFetcher` backed by the pooled hyper client.

use super::client::HttpClient;
use super::{ManifestResponse, PageFetcher};
use crate::catalog::ManifestEndpoint;
use crate::error::PipelineError;
use crate::metrics;
use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, Uri};
use std::time::Instant;
use tracing::{debug, warn};

/// Fetches the manifest and variant pages over HTTP(S).
pub struct HttpPageFetcher {
    client: HttpClient,
    manifest: ManifestEndpoint,
}

impl HttpPageFetcher {
    pub fn new(client: HttpClient, manifest: ManifestEndpoint) -> Self {
        Self { client, manifest }
    }

    /// GET `url` and return the status and the fully collected body.
    /// Non-2xx statuses are reported as `UpstreamFetchFailure`.
    async fn get(
        &self,
        target: &'static str,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<(u16, Bytes), PipelineError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| PipelineError::upstream(url, None, format!("invalid URL: {e}")))?;

        let mut request = Request::builder().method(Method::GET).uri(uri);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
        let request = request
            .body(Empty::<Bytes>::new())
            .map_err(|e| PipelineError::upstream(url, None, format!("invalid request: {e}")))?;

        debug!("Fetching {} from {}", target, url);
        let start = Instant::now();

        let response = self.client.request(request).await.map_err(|e| {
            warn!("Failed to fetch {} from {}: {}", target, url, e);
            metrics::record_upstream_error(target);
            PipelineError::upstream(url, None, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_upstream_duration(
                target,
                status.as_u16(),
                start.elapsed().as_secs_f64() * 1000.0,
            );
            return Err(PipelineError::upstream(
                url,
                Some(status.as_u16()),
                format!("upstream returned {status}"),
            ));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                metrics::record_upstream_error(target);
                PipelineError::upstream(
                    url,
                    Some(status.as_u16()),
                    format!("failed to read body: {e}"),
                )
            })?
            .to_bytes();

        metrics::record_upstream_duration(
            target,
            status.as_u16(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        Ok((status.as_u16(), body))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_manifest(&self) -> Result<ManifestResponse, PipelineError> {
        let (status, body) = self
            .get("manifest", &self.manifest.url, &self.manifest.headers)
            .await?;
        ManifestResponse::parse(&self.manifest.url, status, &body)
    }

    async fn fetch_variant_page(&self, url: &str) -> Result<Bytes, PipelineError> {
        let (_, body) = self.get("page", url, &HeaderMap::new()).await?;
        Ok(body)
    }
}
