//! Streaming element rewriting of variant pages.
//!
//! Each rule is a selector plus a handler invoked per matching element
//! during one forward pass over the document. Markup outside the matched
//! elements' content is passed through untouched.

use crate::config::VariantRecord;
use crate::error::PipelineError;
use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings};
use std::cell::Cell;

/// Input is fed to the engine in slices of this size.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Selectors rewritten on every variant page.
pub const TITLE_SELECTOR: &str = "title";
pub const HEADING_SELECTOR: &str = "h1#title";
pub const DESCRIPTION_SELECTOR: &str = "p#description";
pub const LINK_SELECTOR: &str = "a";

/// Summary of one rewrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Elements whose content was replaced.
    pub elements_rewritten: usize,
    /// Bytes handed to the output sink.
    pub bytes_out: usize,
}

/// Rewrites page elements with the content of one variant record.
pub struct ContentRewriter<'r> {
    record: &'r VariantRecord,
}

impl<'r> ContentRewriter<'r> {
    pub fn new(record: &'r VariantRecord) -> Self {
        Self { record }
    }

    /// Feed `chunks` through the rewriter, handing output to `sink` as soon
    /// as the engine produces it.
    pub fn rewrite_chunks<'c, I, S>(
        &self,
        chunks: I,
        mut sink: S,
    ) -> Result<RewriteStats, PipelineError>
    where
        I: IntoIterator<Item = &'c [u8]>,
        S: FnMut(&[u8]),
    {
        let record = self.record;
        let rewritten = Cell::new(0usize);
        let bytes_out = Cell::new(0usize);

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!(TITLE_SELECTOR, |el| {
                        el.set_inner_content(&record.title, ContentType::Text);
                        rewritten.set(rewritten.get() + 1);
                        Ok(())
                    }),
                    element!(HEADING_SELECTOR, |el| {
                        el.set_inner_content(&record.heading, ContentType::Text);
                        rewritten.set(rewritten.get() + 1);
                        Ok(())
                    }),
                    element!(DESCRIPTION_SELECTOR, |el| {
                        el.set_inner_content(&record.description, ContentType::Text);
                        rewritten.set(rewritten.get() + 1);
                        Ok(())
                    }),
                    element!(LINK_SELECTOR, |el| {
                        el.set_attribute("href", &record.link_url)?;
                        el.set_inner_content(&record.link_text, ContentType::Text);
                        rewritten.set(rewritten.get() + 1);
                        Ok(())
                    }),
                ],
                ..Settings::new()
            },
            |c: &[u8]| {
                bytes_out.set(bytes_out.get() + c.len());
                sink(c);
            },
        );

        for chunk in chunks {
            rewriter
                .write(chunk)
                .map_err(|e| PipelineError::Rewrite(e.to_string()))?;
        }
        rewriter
            .end()
            .map_err(|e| PipelineError::Rewrite(e.to_string()))?;

        Ok(RewriteStats {
            elements_rewritten: rewritten.get(),
            bytes_out: bytes_out.get(),
        })
    }

    /// Rewrite an in-memory document, feeding it in `CHUNK_SIZE` slices.
    pub fn rewrite(&self, html: &[u8]) -> Result<(Vec<u8>, RewriteStats), PipelineError> {
        let mut output = Vec::with_capacity(html.len());
        let stats = self.rewrite_chunks(html.chunks(CHUNK_SIZE), |c| output.extend_from_slice(c))?;
        Ok((output, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VariantRecord {
        VariantRecord {
            title: "New Title".to_string(),
            heading: "New Heading".to_string(),
            description: String::new(),
            link_url: "https://new".to_string(),
            link_text: "Click".to_string(),
        }
    }

    fn rewrite_str(html: &str, record: &VariantRecord) -> (String, RewriteStats) {
        let (out, stats) = ContentRewriter::new(record).rewrite(html.as_bytes()).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_rewrites_title_heading_and_link() {
        let (out, stats) = rewrite_str(
            r##"<title>Old</title><h1 id="title">Old</h1><a href="#">Old</a>"##,
            &record(),
        );
        assert_eq!(
            out,
            r#"<title>New Title</title><h1 id="title">New Heading</h1><a href="https://new">Click</a>"#
        );
        assert_eq!(stats.elements_rewritten, 3);
        assert_eq!(stats.bytes_out, out.len());
    }

    #[test]
    fn test_rewrites_description() {
        let mut record = record();
        record.description = "Fresh copy".to_string();
        let (out, _) = rewrite_str(
            r#"<p id="description">Old copy</p><p>Other</p>"#,
            &record,
        );
        assert_eq!(out, r#"<p id="description">Fresh copy</p><p>Other</p>"#);
    }

    #[test]
    fn test_unmatched_markup_is_byte_identical() {
        let html = "<!DOCTYPE html>\n<html>\n  <body class=\"x\">\n    <h1>Plain</h1>\n    <p>Untouched &amp; kept</p>\n    <!-- comment -->\n  </body>\n</html>\n";
        let (out, stats) = rewrite_str(html, &record());
        assert_eq!(out, html);
        assert_eq!(stats.elements_rewritten, 0);
    }

    #[test]
    fn test_heading_without_id_is_untouched() {
        let (out, _) = rewrite_str(r#"<h1 id="other">Keep</h1>"#, &record());
        assert_eq!(out, r#"<h1 id="other">Keep</h1>"#);
    }

    #[test]
    fn test_link_without_href_gets_one() {
        let (out, _) = rewrite_str("<a>Old</a>", &record());
        assert_eq!(out, r#"<a href="https://new">Click</a>"#);
    }

    #[test]
    fn test_nested_text_outside_matches_preserved() {
        let html = r#"<div><span>before</span><a href="/x"><b>bold</b></a><span>after</span></div>"#;
        let (out, _) = rewrite_str(html, &record());
        assert_eq!(
            out,
            r#"<div><span>before</span><a href="https://new">Click</a><span>after</span></div>"#
        );
    }

    #[test]
    fn test_replacement_text_is_escaped() {
        let mut record = record();
        record.title = "A <b>bold</b> & brave".to_string();
        let (out, _) = rewrite_str("<title>Old</title>", &record);
        assert_eq!(out, "<title>A &lt;b&gt;bold&lt;/b&gt; &amp; brave</title>");
    }

    #[test]
    fn test_output_is_independent_of_chunking() {
        let html = r##"<html><head><title>Old</title></head><body><h1 id="title">Old</h1><p id="description">Old</p><a href="#">Old</a></body></html>"##;
        let record = record();
        let (whole, _) = rewrite_str(html, &record);

        let mut split = Vec::new();
        let chunks: Vec<&[u8]> = html.as_bytes().chunks(3).collect();
        let stats = ContentRewriter::new(&record)
            .rewrite_chunks(chunks, |c| split.extend_from_slice(c))
            .unwrap();

        assert_eq!(String::from_utf8(split).unwrap(), whole);
        assert_eq!(stats.elements_rewritten, 4);
    }

    #[test]
    fn test_sink_receives_output_before_end() {
        let record = record();
        let mut calls = 0;
        let body = "<p>filler</p>".repeat(2_000);
        let html = format!("<title>Old</title>{body}");
        ContentRewriter::new(&record)
            .rewrite_chunks(html.as_bytes().chunks(1024), |_| calls += 1)
            .unwrap();
        assert!(calls > 1);
    }
}
