use clap::builder::BoolishValueParser;
use clap::Parser;
use splitpage::{Config, ResponderServer};
use tracing::info;

/// Splitpage - server-side A/B testing responder
#[derive(Parser, Debug)]
#[command(name = "splitpage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "SPLITPAGE_CONFIG", default_value = "splitpage.yaml")]
    config: String,

    /// Listen port (overrides `listen.port`)
    #[arg(short, long)]
    port: Option<u16>,

    /// Put error messages in response bodies and log every pipeline step
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    debug: Option<bool>,

    /// Honor the urlVariant cookie
    #[arg(long, env = "ENABLE_COOKIE", value_parser = BoolishValueParser::new())]
    enable_cookie: Option<bool>,

    /// Manifest endpoint (overrides `manifest.url`)
    #[arg(long, env = "MANIFEST_URL")]
    manifest_url: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(enabled) = self.enable_cookie {
            config.cookie_stickiness_enabled = enabled;
        }
        if let Some(url) = &self.manifest_url {
            config.manifest.url = url.clone();
        }
        if let Some(port) = self.metrics_port {
            config.metrics.enabled = true;
            config.metrics.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file(&args.config)
        .map_err(|e| anyhow::anyhow!("Failed to load config '{}': {}", args.config, e))?;
    args.apply(&mut config);

    let default_level = if config.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting splitpage with config {}", args.config);
    ResponderServer::new(config)?.run().await
}
