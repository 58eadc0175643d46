use crate::error::RepositoryResult;
use crate::models::IndexedCustomer;
use async_trait::async_trait;

/// Source of the customer records that get indexed.
///
/// Provides abstraction over the relational store the customers live in,
/// enabling different implementations (database, in-memory, mock).
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Fetch every current customer record. May be slow.
    async fn fetch_all_records(&self) -> RepositoryResult<Vec<IndexedCustomer>>;
}
