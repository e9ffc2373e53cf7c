//! Pipeline error kinds and their HTTP mapping.

use hyper::StatusCode;

/// Failures surfaced by the variant pipeline. Every variant is turned into an
/// HTTP response by the request router; none of them abort the process.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP request method {0} not supported")]
    UnsupportedMethod(String),

    #[error("Upstream fetch of {url} failed: {message}")]
    UpstreamFetchFailure {
        url: String,
        /// Upstream status, absent for transport errors.
        status: Option<u16>,
        message: String,
    },

    #[error("Manifest lists no variants")]
    EmptyManifest,

    #[error("Malformed variant URL '{url}': {reason}")]
    MalformedVariantUrl { url: String, reason: String },

    #[error("Failed to rewrite variant page: {0}")]
    Rewrite(String),
}

impl PipelineError {
    pub fn upstream(url: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamFetchFailure {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn malformed(url: &str, reason: impl Into<String>) -> Self {
        Self::MalformedVariantUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Upstream status carried by the error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamFetchFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// Status returned to the client.
    ///
    /// Upstream 4xx/5xx statuses are mirrored. Anything else without a
    /// meaningful status (transport errors, malformed bodies, selection
    /// failures) falls back to 404.
    pub fn response_status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMethod(_) => StatusCode::BAD_REQUEST,
            Self::Rewrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamFetchFailure {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::NOT_FOUND),
            _ => StatusCode::NOT_FOUND,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedMethod(_) => "unsupported_method",
            Self::UpstreamFetchFailure { .. } => "upstream_fetch_failure",
            Self::EmptyManifest => "empty_manifest",
            Self::MalformedVariantUrl { .. } => "malformed_variant_url",
            Self::Rewrite(_) => "rewrite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = PipelineError::upstream("https://x/api", Some(503), "returned 503");
        assert_eq!(err.upstream_status(), Some(503));
        assert_eq!(err.response_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_transport_error_defaults_to_not_found() {
        let err = PipelineError::upstream("https://x/api", None, "connection refused");
        assert_eq!(err.upstream_status(), None);
        assert_eq!(err.response_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_successful_status_with_bad_body_defaults_to_not_found() {
        let err = PipelineError::upstream("https://x/api", Some(200), "invalid JSON");
        assert_eq!(err.response_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_redirect_status_is_not_mirrored() {
        let err = PipelineError::upstream("https://x/page1", Some(302), "returned 302");
        assert_eq!(err.response_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_selection_errors_map_to_not_found() {
        assert_eq!(
            PipelineError::EmptyManifest.response_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PipelineError::malformed("https://x/pageA", "not a digit").response_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_method_and_rewrite_statuses() {
        assert_eq!(
            PipelineError::UnsupportedMethod("POST".into()).response_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::Rewrite("bad".into()).response_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = PipelineError::malformed("https://x/pageA", "trailing character 'A' is not a digit");
        let message = err.to_string();
        assert!(message.contains("https://x/pageA"));
        assert!(message.contains("not a digit"));
        assert_eq!(err.kind(), "malformed_variant_url");
    }
}
