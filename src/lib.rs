//! Customer Search - a full-text search engine over customer names.
//!
//! Customers are indexed by full name and found through a single combined
//! query: exact terms, prefixes and one- or two-edit typos. The index is
//! rebuilt wholesale from a record source on a fixed schedule, and searches
//! keep reading the last committed generation while a rebuild runs.
//!
//! # Architecture
//!
//! - **models**: Indexed customer records and search hits
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables
//! - **index**: Index store, writer and reader snapshots
//! - **search**: Query construction and evaluation
//! - **repositories**: Sources of customer records
//! - **services**: Rebuild cycle, background scheduler and the search facade
//! - **observability**: Counters and timers

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod search;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, RepositoryError, SearchError, SearchResult};
pub use index::{CustomerIndex, IndexGeneration, Snapshot, SnapshotManager};
pub use models::{IndexedCustomer, SearchHit};
pub use observability::{MetricsSnapshot, SearchMetrics};
pub use repositories::{CustomerRepository, InMemoryCustomerRepository};
pub use search::QueryEvaluator;
pub use services::{
    CustomerSearchService, CustomerSearchServiceImpl, IndexRebuilder, IndexStatus,
    RebuildReport, RebuildScheduler,
};
