//! Startup-validated variant records and manifest endpoint.

use crate::config::{Config, ManifestConfig, VariantRecord};
use hyper::header::{HeaderName, HeaderValue};
use hyper::HeaderMap;

/// Where the manifest lives and how to ask for it.
#[derive(Debug, Clone)]
pub struct ManifestEndpoint {
    pub url: String,
    pub headers: HeaderMap,
}

impl ManifestEndpoint {
    fn from_config(manifest: &ManifestConfig) -> Result<Self, anyhow::Error> {
        manifest.validate().map_err(|e| anyhow::anyhow!(e))?;

        let mut headers = HeaderMap::with_capacity(manifest.headers.len());
        for (name, value) in &manifest.headers {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(value)?;
            headers.insert(name, value);
        }

        Ok(Self {
            url: manifest.url.trim().to_string(),
            headers,
        })
    }
}

/// Read-only list of variant records plus the manifest endpoint.
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    variants: Vec<VariantRecord>,
    manifest: ManifestEndpoint,
}

impl VariantCatalog {
    /// Build the catalog, failing fast on an unusable configuration.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        config.validate()?;
        Ok(Self {
            variants: config.variants.clone(),
            manifest: ManifestEndpoint::from_config(&config.manifest)?,
        })
    }

    pub fn manifest(&self) -> &ManifestEndpoint {
        &self.manifest
    }

    pub fn variants(&self) -> &[VariantRecord] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VariantRecord> {
        self.variants.get(index)
    }
}
