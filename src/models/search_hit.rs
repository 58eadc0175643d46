//! A single ranked search result.

use serde::{Deserialize, Serialize};

/// A customer matched by a search, with its combined relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Customer key, echoed verbatim from the index
    #[serde(rename = "customerKey")]
    pub key: String,

    /// Full name as stored
    pub full_name: String,

    /// Sum of the exact, prefix and fuzzy clause scores (never negative)
    pub score: f32,
}
