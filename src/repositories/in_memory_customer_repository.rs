use crate::error::RepositoryResult;
use crate::models::IndexedCustomer;
use crate::repositories::dummy_data::dummy_customers;
use crate::repositories::traits::CustomerRepository;
use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

/// Customer repository holding its records in memory.
///
/// Stands in for the relational customer table: the whole set can be
/// swapped out, and the search index picks the change up on its next
/// rebuild.
#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Vec<IndexedCustomer>>,
}

impl InMemoryCustomerRepository {
    /// Create a repository with the given customers.
    pub fn new(customers: Vec<IndexedCustomer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Create a repository seeded with `count` generated customers.
    pub fn with_dummy_customers(count: usize) -> Self {
        Self::new(dummy_customers(count))
    }

    /// Replace every stored customer.
    pub fn replace_all_customers(&self, customers: Vec<IndexedCustomer>) {
        *self.customers.write().unwrap_or_else(PoisonError::into_inner) = customers;
    }

    /// First `top_n` customers in storage order.
    pub fn list(&self, top_n: usize) -> Vec<IndexedCustomer> {
        self.customers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .take(top_n)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.customers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn fetch_all_records(&self) -> RepositoryResult<Vec<IndexedCustomer>> {
        Ok(self
            .customers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_all_records() {
        let repo = InMemoryCustomerRepository::new(vec![
            IndexedCustomer::new("1", "Alice Johnson"),
            IndexedCustomer::new("2", "Bob Stone"),
        ]);

        let records = tokio_test::block_on(repo.fetch_all_records()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name, "Alice Johnson");
    }

    #[test]
    fn test_replace_all_customers_and_list() {
        let repo = InMemoryCustomerRepository::with_dummy_customers(50);
        assert_eq!(repo.len(), 50);
        assert_eq!(repo.list(10).len(), 10);

        repo.replace_all_customers(vec![IndexedCustomer::new("9", "Zed Zulu")]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.list(100)[0].key, "9");

        repo.replace_all_customers(Vec::new());
        assert!(repo.is_empty());
    }
}
