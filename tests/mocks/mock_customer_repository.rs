use async_trait::async_trait;
use customer_search::error::{RepositoryError, RepositoryResult};
use customer_search::models::IndexedCustomer;
use customer_search::repositories::CustomerRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock customer repository for testing.
///
/// Serves a configurable record set, can fail a number of fetches or delay
/// each one, and tracks calls and overlapping fetches for verification.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockCustomerRepository {
    customers: Arc<Mutex<Vec<IndexedCustomer>>>,
    calls: Arc<AtomicUsize>,
    failures_remaining: Arc<AtomicUsize>,
    delay: Arc<Mutex<Option<Duration>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockCustomerRepository {
    /// Create a new empty MockCustomerRepository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository serving the given customers.
    pub fn with_customers(customers: Vec<IndexedCustomer>) -> Self {
        let repo = Self::new();
        repo.set_customers(customers);
        repo
    }

    /// Replace the record set served by later fetches.
    pub fn set_customers(&self, customers: Vec<IndexedCustomer>) {
        *self.customers.lock().unwrap() = customers;
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Sleep this long inside every fetch.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of fetches started so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that ran at the same time.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` fetches have started.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl CustomerRepository for MockCustomerRepository {
    async fn fetch_all_records(&self) -> RepositoryResult<Vec<IndexedCustomer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        let result = if failing {
            Err(RepositoryError::Unavailable(
                "mock record source offline".to_string(),
            ))
        } else {
            Ok(self.customers.lock().unwrap().clone())
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
