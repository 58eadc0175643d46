//! Customer record handed to the index writer.

use serde::{Deserialize, Serialize};

/// A customer as produced by the record source.
///
/// `key` is an opaque, unique identifier matched exactly; `full_name` is free
/// text that gets tokenized for searching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct IndexedCustomer {
    /// Unique customer key, e.g. `0000000042`
    #[serde(rename = "customerKey")]
    pub key: String,

    /// Full display name
    pub full_name: String,
}

impl IndexedCustomer {
    /// Create a new customer record.
    pub fn new(key: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            full_name: full_name.into(),
        }
    }

    /// Whether both fields carry a value that can be indexed.
    pub fn is_indexable(&self) -> bool {
        !self.key.trim().is_empty() && !self.full_name.trim().is_empty()
    }
}
