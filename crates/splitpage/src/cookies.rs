//! Request cookie parsing and the sticky-variant cookie.

use hyper::header::{HeaderMap, COOKIE};
use std::collections::HashMap;

/// Name of the cookie holding the sticky variant URL.
pub const VARIANT_COOKIE: &str = "urlVariant";

/// Cookies sent by the client, keyed by name. Values are URL-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieMap {
    entries: HashMap<String, String>,
}

impl CookieMap {
    /// Parse a `Cookie` header value.
    ///
    /// Pairs are split on `;` and then on the first `=`. Keys are trimmed,
    /// values are URL-decoded (kept raw if they are not valid
    /// percent-encoding). Segments without `=` are ignored and later
    /// duplicates win. An empty header yields an empty map.
    pub fn parse(header: &str) -> Self {
        let entries = header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .filter_map(|(key, value)| {
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                let value = urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((key.to_string(), value))
            })
            .collect();
        Self { entries }
    }

    /// Parse every `Cookie` header of a request. Headers that are not valid
    /// visible ASCII are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(";");
        Self::parse(&joined)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sticky variant URL, if the client sent one.
    pub fn sticky_variant(&self) -> Option<&str> {
        self.get(VARIANT_COOKIE)
    }
}

/// `Set-Cookie` value pinning a freshly selected variant. Session scoped:
/// no expiry, path or domain attributes.
pub fn build_set_cookie_header(variant_url: &str) -> String {
    format!("{VARIANT_COOKIE}={variant_url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_parse_sticky_and_other() {
        let cookies = CookieMap::parse("urlVariant=https://x/page2; other=val");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("urlVariant"), Some("https://x/page2"));
        assert_eq!(cookies.get("other"), Some("val"));
        assert_eq!(cookies.sticky_variant(), Some("https://x/page2"));
    }

    #[test]
    fn test_parse_empty_header() {
        let cookies = CookieMap::parse("");
        assert!(cookies.is_empty());
        assert!(!cookies.contains(VARIANT_COOKIE));
        assert_eq!(cookies.sticky_variant(), None);
    }

    #[test]
    fn test_parse_decodes_values() {
        let cookies = CookieMap::parse("urlVariant=https%3A%2F%2Fx%2Fpage1");
        assert_eq!(cookies.sticky_variant(), Some("https://x/page1"));
    }

    #[test]
    fn test_parse_keeps_invalid_encoding_raw() {
        let cookies = CookieMap::parse("a=%FF%FE");
        assert_eq!(cookies.get("a"), Some("%FF%FE"));
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let cookies = CookieMap::parse("token=abc==; q=a=b");
        assert_eq!(cookies.get("token"), Some("abc=="));
        assert_eq!(cookies.get("q"), Some("a=b"));
    }

    #[test]
    fn test_parse_ignores_segments_without_value() {
        let cookies = CookieMap::parse("flag; ; =orphan; a=1");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("a"), Some("1"));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let cookies = CookieMap::parse("a=1; a=2");
        assert_eq!(cookies.get("a"), Some("2"));
    }

    #[test]
    fn test_from_headers_joins_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("urlVariant=https://x/page3"));
        let cookies = CookieMap::from_headers(&headers);
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.sticky_variant(), Some("https://x/page3"));
    }

    #[test]
    fn test_from_headers_without_cookie() {
        assert!(CookieMap::from_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_build_set_cookie_header() {
        assert_eq!(
            build_set_cookie_header("https://x/page2"),
            "urlVariant=https://x/page2"
        );
    }
}
