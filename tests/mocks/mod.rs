//! Test doubles shared by the integration tests.

mod mock_customer_repository;

#[allow(unused_imports)]
pub use mock_customer_repository::MockCustomerRepository;
