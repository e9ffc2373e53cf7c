//! Listen and metrics configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen_port")]
    pub port: u16,
}

fn default_listen_port() -> u16 {
    8787
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            port: default_listen_port(),
        }
    }
}

/// Prometheus exposition listener. Served on its own port so that every path
/// on the main listener stays part of the experiment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}
