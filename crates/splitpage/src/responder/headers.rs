//! Safe header insertion helpers.
//!
//! Static header names and values used by the responder, plus an extension
//! trait that inserts dynamic values without `.parse().unwrap()` at call
//! sites.

use hyper::header::{HeaderName, HeaderValue};
use hyper::Response;

/// Variant ordinal served, only attached in debug mode.
pub static X_SPLITPAGE_VARIANT: HeaderName = HeaderName::from_static("x-splitpage-variant");
/// `sticky` or `fresh`, only attached in debug mode.
pub static X_SPLITPAGE_SELECTION: HeaderName = HeaderName::from_static("x-splitpage-selection");

pub static TEXT_HTML: HeaderValue = HeaderValue::from_static("text/html");
pub static TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");

/// Extension trait for inserting headers into responses.
pub trait ResponderHeadersExt {
    /// Insert a header with a static name and value.
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue);

    /// Insert a header with a dynamic string value.
    /// Returns false if the value is not a valid header value.
    fn set_header_value(&mut self, name: &HeaderName, value: &str) -> bool;
}

impl<B> ResponderHeadersExt for Response<B> {
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        self.headers_mut().insert(name.clone(), value.clone());
    }

    fn set_header_value(&mut self, name: &HeaderName, value: &str) -> bool {
        match HeaderValue::from_str(value) {
            Ok(header_value) => {
                self.headers_mut().insert(name.clone(), header_value);
                true
            }
            Err(_) => false,
        }
    }
}
