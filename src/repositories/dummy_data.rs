//! Deterministic dummy customers for development and benchmarks.

use crate::models::IndexedCustomer;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Walter", "Maria", "James", "Linda", "Robert", "Patricia", "Michael", "Barbara",
    "William", "Elizabeth", "David", "Jennifer", "Richard", "Susan", "Joseph", "Jessica",
    "Thomas", "Sarah", "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony",
    "Betty", "Mark", "Margaret", "Donald", "Sandra", "Steven", "Ashley", "Paul", "Kimberly",
    "Andrew", "Emily", "Joshua", "Donna", "Kenneth", "Michelle", "Kevin", "Dorothy", "Brian",
    "Carol", "George", "Amanda", "Edward", "Melissa", "Ronald", "Deborah", "Timothy", "Wallace",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Walsh", "Waller", "Wall",
];

/// Format a customer number as a 10 character key with leading zeros.
pub fn customer_key(number: usize) -> String {
    format!("{:010}", number)
}

/// Generate `count` customers with keys `0000000001..` and names drawn from
/// fixed tables. The same `count` always yields the same customers.
pub fn dummy_customers(count: usize) -> Vec<IndexedCustomer> {
    (1..=count)
        .map(|number| {
            // Coprime strides spread the combinations across both tables.
            let first = FIRST_NAMES[(number * 7) % FIRST_NAMES.len()];
            let last = LAST_NAMES[(number * 13 + number / LAST_NAMES.len()) % LAST_NAMES.len()];
            IndexedCustomer::new(customer_key(number), format!("{} {}", first, last))
        })
        .collect()
}
