//! Prometheus exposition server.

use super::response::{text_response, ResponseExt};
use crate::metrics::collect_metrics;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Serves `GET /metrics` on its own port.
pub struct MetricsServer {
    addr: SocketAddr,
}

impl MetricsServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("Metrics listening on http://{}/metrics", self.addr);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);

            tokio::spawn(async move {
                let service = service_fn(|req| async move { Ok::<_, Infallible>(route(&req)) });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Metrics connection error: {}", e);
                }
            });
        }
    }
}

fn route<B>(req: &Request<B>) -> Response<BoxBody<Bytes, hyper::Error>> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => text_response(StatusCode::OK, collect_metrics()),
        _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
    }
    .into_boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_metrics() {
        crate::metrics::record_request("GET", 200);
        let req = Request::builder().uri("/metrics").body(()).unwrap();
        assert_eq!(route(&req).status(), StatusCode::OK);
    }

    #[test]
    fn test_route_unknown_path() {
        let req = Request::builder().uri("/other").body(()).unwrap();
        assert_eq!(route(&req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_route_rejects_post() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/metrics")
            .body(())
            .unwrap();
        assert_eq!(route(&req).status(), StatusCode::NOT_FOUND);
    }
}
