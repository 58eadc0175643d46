//! Data models for indexed customers and search results.

pub mod customer;
pub mod search_hit;

pub use customer::IndexedCustomer;
pub use search_hit::SearchHit;
