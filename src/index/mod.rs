//! Customer index: schema, store with its single writer, and read snapshots.

pub mod schema;
pub mod snapshot;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use schema::CustomerFields;
pub use snapshot::{Snapshot, SnapshotManager};
pub use store::CustomerIndex;

/// Version of the committed index, advanced once per successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexGeneration(u64);

impl IndexGeneration {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndexGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
