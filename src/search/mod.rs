//! Query evaluation over customer index snapshots.
//!
//! Every search combines three strategies on the tokenized full name: an
//! exact (parsed, BM25-ranked) query, a prefix query for partially typed
//! words, and a fuzzy query for misspellings.

pub mod query_evaluator;

pub use query_evaluator::{QueryEvaluator, FUZZY_MAX_EDITS};
