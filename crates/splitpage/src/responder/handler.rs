//! Request routing and the variant pipeline.
//!
//! Every request goes through two states: dispatch on the method, then
//! respond. GET runs the pipeline (manifest, selection, page, rewrite,
//! cookie); anything else is answered immediately without touching an
//! upstream.

use super::headers::{ResponderHeadersExt, X_SPLITPAGE_SELECTION, X_SPLITPAGE_VARIANT};
use super::response::{error_response, html_response, ResponseExt};
use crate::catalog::VariantCatalog;
use crate::cookies::{build_set_cookie_header, CookieMap};
use crate::error::PipelineError;
use crate::fetcher::PageFetcher;
use crate::metrics;
use crate::observer::PipelineObserver;
use crate::rewriter::ContentRewriter;
use crate::selector::select_variant;

use http_body_util::combinators::BoxBody;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::SET_COOKIE;
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::time::Instant;
use tracing::debug;

/// Everything a request needs; shared read-only across requests.
pub struct RequestHandlerContext<'a> {
    pub catalog: &'a VariantCatalog,
    pub fetcher: &'a dyn PageFetcher,
    pub observer: &'a dyn PipelineObserver,
    /// Verbose error bodies and variant headers.
    pub debug: bool,
    pub cookie_stickiness_enabled: bool,
}

/// Outcome of dispatching on the request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Pipeline,
    Reject,
}

pub fn dispatch(method: &Method) -> Dispatch {
    if method == Method::GET {
        Dispatch::Pipeline
    } else {
        Dispatch::Reject
    }
}

/// Handle an incoming request. Never fails: every pipeline error becomes an
/// HTTP response.
pub async fn handle_request<B>(
    ctx: &RequestHandlerContext<'_>,
    req: Request<B>,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, Infallible> {
    let start_time = Instant::now();
    // The body is never read.
    let (parts, _) = req.into_parts();

    debug!("Received request: {} {}", parts.method, parts.uri);

    let result = match dispatch(&parts.method) {
        Dispatch::Pipeline => run_pipeline(ctx, &parts.headers).await,
        Dispatch::Reject => Err(PipelineError::UnsupportedMethod(
            parts.method.to_string(),
        )),
    };

    let response = match result {
        Ok(response) => response,
        Err(error) => {
            ctx.observer.request_failed(&error);
            error_response(&error, ctx.debug)
        }
    };

    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    metrics::record_request_duration(parts.method.as_str(), duration_ms);
    metrics::record_request(parts.method.as_str(), response.status().as_u16());
    Ok(response.into_boxed())
}

/// Fetch, select, rewrite. The page is fully rewritten before a response is
/// built so a failure can never produce a truncated page.
async fn run_pipeline(
    ctx: &RequestHandlerContext<'_>,
    headers: &HeaderMap,
) -> Result<Response<Full<Bytes>>, PipelineError> {
    let cookies = CookieMap::from_headers(headers);

    let manifest = ctx.fetcher.fetch_manifest().await?;
    ctx.observer.manifest_fetched(&manifest);

    let selection = select_variant(
        &manifest,
        &cookies,
        ctx.cookie_stickiness_enabled,
        ctx.catalog.len(),
    )?;
    ctx.observer.variant_selected(&selection);

    let record = ctx.catalog.get(selection.index).ok_or_else(|| {
        PipelineError::malformed(&selection.url, "variant index has no content record")
    })?;

    let html = ctx.fetcher.fetch_variant_page(&selection.url).await?;
    let (body, stats) = ContentRewriter::new(record).rewrite(&html)?;
    ctx.observer.rewrite_applied(&selection, &stats);

    let mut response = html_response(Bytes::from(body));

    let set_cookie = if selection.needs_cookie() {
        let value = build_set_cookie_header(&selection.url);
        response
            .set_header_value(&SET_COOKIE, &value)
            .then_some(value)
    } else {
        None
    };
    ctx.observer
        .cookie_decision(&selection, set_cookie.as_deref());

    if ctx.debug {
        response.set_header_value(&X_SPLITPAGE_VARIANT, &(selection.index + 1).to_string());
        response.set_header_value(&X_SPLITPAGE_SELECTION, selection.source.as_str());
    }

    Ok(response)
}
