//! Configuration types for Splitpage.

mod listen;
mod upstream;
mod variants;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use listen::{ListenConfig, MetricsConfig};
pub use upstream::{ConnectionPoolConfig, ManifestConfig};
pub use variants::VariantRecord;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Diagnostic mode: verbose pipeline logs and error messages in
    /// response bodies.
    #[serde(default)]
    pub debug: bool,

    /// Honor the `urlVariant` cookie instead of drawing a new variant.
    #[serde(
        default = "default_cookie_stickiness",
        alias = "enable_cookie",
        alias = "cookieStickinessEnabled"
    )]
    pub cookie_stickiness_enabled: bool,

    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub connection_pool: ConnectionPoolConfig,

    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

fn default_cookie_stickiness() -> bool {
    true
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Validate configuration. Called once before the server binds so a
    /// broken deployment never serves traffic.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.manifest.validate().map_err(|e| anyhow::anyhow!(e))?;

        if self.variants.is_empty() {
            anyhow::bail!("At least one entry in 'variants' is required");
        }

        for (idx, variant) in self.variants.iter().enumerate() {
            if variant.link_url.trim().is_empty() {
                anyhow::bail!("Variant {} has an empty 'link_url'", idx + 1);
            }
        }

        if self.metrics.enabled && self.metrics.port == self.listen.port {
            anyhow::bail!(
                "Metrics port {} collides with the listen port",
                self.metrics.port
            );
        }

        Ok(())
    }
}
