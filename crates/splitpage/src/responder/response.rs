//! Response construction for pages and failures.

use super::headers::{ResponderHeadersExt, TEXT_HTML, TEXT_PLAIN};
use crate::error::PipelineError;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use std::convert::Infallible;

/// Body returned for every method other than GET.
pub const UNSUPPORTED_METHOD_BODY: &str =
    "HTTP request method not supported! Please use GET only...";

/// Plain-text response with the given status.
pub fn text_response(status: StatusCode, message: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(message.into()));
    *response.status_mut() = status;
    response.set_header(&CONTENT_TYPE, &TEXT_PLAIN);
    response
}

/// 200 response carrying a rewritten page.
pub fn html_response(body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    response.set_header(&CONTENT_TYPE, &TEXT_HTML);
    response
}

/// Fixed 400 response for non-GET requests.
pub fn unsupported_method_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::BAD_REQUEST, UNSUPPORTED_METHOD_BODY)
}

/// Map a pipeline failure to a response. In debug mode the body carries the
/// error message, otherwise only the status.
pub fn error_response(error: &PipelineError, debug: bool) -> Response<Full<Bytes>> {
    if let PipelineError::UnsupportedMethod(_) = error {
        return unsupported_method_response();
    }

    let status = error.response_status();
    let message = if debug {
        error.to_string()
    } else {
        format!("HTTP Error: {}", status.as_u16())
    };
    text_response(status, message)
}

/// Extension trait for boxing `Full` responses into the server body type.
pub trait ResponseExt {
    fn into_boxed(self) -> Response<BoxBody<Bytes, hyper::Error>>;
}

impl ResponseExt for Response<Full<Bytes>> {
    fn into_boxed(self) -> Response<BoxBody<Bytes, hyper::Error>> {
        self.map(|b| BoxBody::new(b.map_err(|never: Infallible| match never {})))
    }
}
