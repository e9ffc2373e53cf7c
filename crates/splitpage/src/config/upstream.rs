//! Manifest endpoint and connection pool configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remote manifest listing the variant page URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    #[serde(default)]
    pub url: String,
    /// Headers sent with every manifest request.
    #[serde(default = "default_manifest_headers")]
    pub headers: BTreeMap<String, String>,
}

fn default_manifest_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "text/html".to_string())])
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            headers: default_manifest_headers(),
        }
    }
}

impl ManifestConfig {
    /// Check that the URL is absolute http(s) and every header is sendable.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err("manifest.url is required".to_string());
        }

        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| format!("Invalid manifest URL (missing scheme): {url}"))?;
        if scheme != "http" && scheme != "https" {
            return Err(format!(
                "Unsupported manifest URL scheme '{scheme}'. Currently supported: http, https"
            ));
        }
        url.parse::<hyper::Uri>()
            .map_err(|e| format!("Invalid manifest URL '{url}': {e}"))?;

        for (name, value) in &self.headers {
            hyper::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| format!("Invalid manifest header name: '{name}'"))?;
            hyper::header::HeaderValue::from_str(value)
                .map_err(|_| format!("Invalid value for manifest header '{name}'"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionPoolConfig {
    #[serde(default = "default_pool_max_idle_per_host")]
    pub max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_keepalive_timeout")]
    pub keepalive_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_pool_max_idle_per_host(),
            idle_timeout_secs: default_pool_idle_timeout(),
            keepalive_timeout_secs: default_keepalive_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_keepalive_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    5
}
