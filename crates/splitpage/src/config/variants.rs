//! Variant content records.

use serde::{Deserialize, Serialize};

/// Content substituted into a variant page.
///
/// Records are positional: the record at index `i` belongs to the manifest
/// entry whose URL ends in the digit `i + 1`, unless the entry carries an
/// explicit index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariantRecord {
    pub title: String,
    pub heading: String,
    #[serde(default)]
    pub description: String,
    pub link_url: String,
    pub link_text: String,
}
