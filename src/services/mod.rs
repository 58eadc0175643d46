//! Application service layer.
//!
//! Services orchestrate the index store, the query evaluator and the record
//! source. [`CustomerSearchService`] is the boundary callers talk to.

mod rebuild_scheduler;
mod rebuild_service;
mod search_service;

pub use rebuild_scheduler::{RebuildScheduler, DEFAULT_REBUILD_INTERVAL};
pub use rebuild_service::{IndexRebuilder, RebuildReport};
pub use search_service::{
    rebuild_on_startup, CustomerSearchService, CustomerSearchServiceImpl, IndexStatus,
};
