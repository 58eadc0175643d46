pub mod dummy_data;
mod in_memory_customer_repository;
mod traits;

pub use in_memory_customer_repository::InMemoryCustomerRepository;
pub use traits::CustomerRepository;
