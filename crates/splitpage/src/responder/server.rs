//! ResponderServer struct and main run loop.
//!
//! This module contains the ResponderServer which holds all shared state,
//! and the run loop that accepts connections and handles requests.

use super::handler::{handle_request, RequestHandlerContext};
use super::metrics_server::MetricsServer;
use crate::catalog::VariantCatalog;
use crate::config::Config;
use crate::fetcher::{create_http_client, HttpPageFetcher, PageFetcher};
use crate::observer::{PipelineObserver, TracingObserver};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// The main responder server struct.
pub struct ResponderServer {
    config: Arc<Config>,
    catalog: Arc<VariantCatalog>,
    fetcher: Arc<dyn PageFetcher>,
    observer: Arc<dyn PipelineObserver>,
}

impl ResponderServer {
    /// Create a new ResponderServer fetching over HTTP(S).
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let catalog = VariantCatalog::from_config(&config)?;
        let http_client = create_http_client(&config.connection_pool);
        let fetcher = Arc::new(HttpPageFetcher::new(
            http_client,
            catalog.manifest().clone(),
        ));
        Ok(Self::with_parts(config, catalog, fetcher))
    }

    /// Create a ResponderServer around an existing fetcher.
    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, anyhow::Error> {
        let catalog = VariantCatalog::from_config(&config)?;
        Ok(Self::with_parts(config, catalog, fetcher))
    }

    fn with_parts(config: Config, catalog: VariantCatalog, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            fetcher,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the pipeline observer.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Bind the configured port (and metrics port, if enabled) and serve.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        if self.config.metrics.enabled {
            let metrics_addr = SocketAddr::from(([0, 0, 0, 0], self.config.metrics.port));
            tokio::spawn(async move {
                if let Err(e) = MetricsServer::new(metrics_addr).run().await {
                    error!("Metrics server stopped: {}", e);
                }
            });
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.listen.port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve requests from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        info!("Listening on http://{}", listener.local_addr()?);
        info!("Manifest: {}", self.catalog.manifest().url);
        info!(
            "Loaded {} variants (cookie stickiness {}, debug {})",
            self.catalog.len(),
            if self.config.cookie_stickiness_enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.config.debug
        );

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let server = Arc::clone(&server);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { server.handle_request_internal(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving HTTP connection from {}: {}", remote_addr, err);
                }
            });
        }
    }

    /// Internal request handler that builds the context and delegates to handler module.
    async fn handle_request_internal(
        &self,
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<hyper::Response<BoxBody<Bytes, hyper::Error>>, Infallible> {
        let ctx = RequestHandlerContext {
            catalog: &self.catalog,
            fetcher: self.fetcher.as_ref(),
            observer: self.observer.as_ref(),
            debug: self.config.debug,
            cookie_stickiness_enabled: self.config.cookie_stickiness_enabled,
        };

        handle_request(&ctx, req).await
    }
}
