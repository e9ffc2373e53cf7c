//! Variant selection: uniform random draw or sticky cookie.

use crate::cookies::CookieMap;
use crate::error::PipelineError;
use crate::fetcher::ManifestResponse;
use rand::Rng;

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Reused from the client's `urlVariant` cookie.
    Sticky,
    /// Drawn at random for this request.
    Fresh,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionSource::Sticky => "sticky",
            SelectionSource::Fresh => "fresh",
        }
    }
}

/// Per-request selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub url: String,
    pub index: usize,
    pub source: SelectionSource,
}

impl Selection {
    /// A fresh selection must be pinned with `Set-Cookie`.
    pub fn needs_cookie(&self) -> bool {
        self.source == SelectionSource::Fresh
    }
}

/// Pick a manifest URL uniformly at random.
pub fn pick_random_variant_url(manifest: &ManifestResponse) -> Result<&str, PipelineError> {
    pick_random_variant_url_with(manifest, &mut rand::thread_rng())
}

/// Same as [`pick_random_variant_url`] with a caller supplied generator.
pub fn pick_random_variant_url_with<'m>(
    manifest: &'m ManifestResponse,
    rng: &mut impl Rng,
) -> Result<&'m str, PipelineError> {
    if manifest.is_empty() {
        return Err(PipelineError::EmptyManifest);
    }
    let idx = rng.gen_range(0..manifest.len());
    Ok(manifest.variants[idx].url())
}

/// Derive the 0-based variant index from the last character of the URL
/// path, read as a 1-based digit. Query and fragment are ignored.
pub fn resolve_variation_index(url: &str, variant_count: usize) -> Result<usize, PipelineError> {
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e| PipelineError::malformed(url, format!("not a valid URL: {e}")))?;

    let last = uri
        .path()
        .chars()
        .last()
        .ok_or_else(|| PipelineError::malformed(url, "empty path"))?;

    let ordinal = last.to_digit(10).ok_or_else(|| {
        PipelineError::malformed(url, format!("trailing character '{last}' is not a digit"))
    })?;

    check_index(url, (ordinal as usize).checked_sub(1), variant_count)
}

/// Resolve the index for `url`, preferring an explicit index from its
/// manifest entry over the trailing-digit convention.
pub fn resolve_entry_index(
    manifest: &ManifestResponse,
    url: &str,
    variant_count: usize,
) -> Result<usize, PipelineError> {
    match manifest.find(url).and_then(|entry| entry.explicit_index()) {
        Some(index) => check_index(url, Some(index), variant_count),
        None => resolve_variation_index(url, variant_count),
    }
}

fn check_index(
    url: &str,
    index: Option<usize>,
    variant_count: usize,
) -> Result<usize, PipelineError> {
    match index {
        Some(index) if index < variant_count => Ok(index),
        _ => Err(PipelineError::malformed(
            url,
            format!("variant index out of range (expected 1..={variant_count})"),
        )),
    }
}

/// Choose the variant for a request.
///
/// The sticky cookie is honored when stickiness is enabled and the cookie
/// names a URL that is still listed in the manifest. Otherwise a fresh
/// uniform draw is made.
pub fn select_variant(
    manifest: &ManifestResponse,
    cookies: &CookieMap,
    stickiness_enabled: bool,
    variant_count: usize,
) -> Result<Selection, PipelineError> {
    let sticky = cookies
        .sticky_variant()
        .filter(|_| stickiness_enabled)
        .filter(|url| manifest.find(url).is_some());

    let (url, source) = match sticky {
        Some(url) => (url, SelectionSource::Sticky),
        None => (pick_random_variant_url(manifest)?, SelectionSource::Fresh),
    };

    let index = resolve_entry_index(manifest, url, variant_count)?;
    Ok(Selection {
        url: url.to_string(),
        index,
        source,
    })
}
