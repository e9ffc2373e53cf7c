//! Pipeline checkpoints.
//!
//! The request router reports progress through a [`PipelineObserver`]
//! instead of logging inline. The default [`TracingObserver`] turns each
//! checkpoint into a `debug` level event and updates the Prometheus counters.

use crate::error::PipelineError;
use crate::fetcher::ManifestResponse;
use crate::metrics;
use crate::rewriter::RewriteStats;
use crate::selector::Selection;
use tracing::{debug, warn};

pub trait PipelineObserver: Send + Sync {
    fn manifest_fetched(&self, _manifest: &ManifestResponse) {}

    fn variant_selected(&self, _selection: &Selection) {}

    /// `set_cookie` is the header value attached to the response, if any.
    fn cookie_decision(&self, _selection: &Selection, _set_cookie: Option<&str>) {}

    fn rewrite_applied(&self, _selection: &Selection, _stats: &RewriteStats) {}

    fn request_failed(&self, _error: &PipelineError) {}
}

/// Observer that emits `tracing` events and records metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn manifest_fetched(&self, manifest: &ManifestResponse) {
        debug!(entries = manifest.len(), "Manifest fetched");
    }

    fn variant_selected(&self, selection: &Selection) {
        metrics::record_selection(selection.source.as_str());
        debug!(
            url = %selection.url,
            index = selection.index,
            source = selection.source.as_str(),
            "Variant selected"
        );
    }

    fn cookie_decision(&self, selection: &Selection, set_cookie: Option<&str>) {
        match set_cookie {
            Some(value) => debug!(set_cookie = value, "Pinning fresh selection"),
            None if selection.needs_cookie() => {
                warn!(url = %selection.url, "Variant URL is not a valid cookie value, not pinned")
            }
            None => debug!("Sticky selection reused, no Set-Cookie"),
        }
    }

    fn rewrite_applied(&self, selection: &Selection, stats: &RewriteStats) {
        debug!(
            index = selection.index,
            elements = stats.elements_rewritten,
            bytes = stats.bytes_out,
            "Rewrite applied"
        );
    }

    fn request_failed(&self, error: &PipelineError) {
        metrics::record_pipeline_error(error.kind());
        match error {
            PipelineError::UnsupportedMethod(_) => debug!(kind = error.kind(), "{}", error),
            _ => warn!(kind = error.kind(), "{}", error),
        }
    }
}
