//! Combined exact/prefix/fuzzy query evaluation.

use crate::error::{SearchError, SearchResult};
use crate::index::schema::analyze;
use crate::index::{CustomerFields, CustomerIndex, Snapshot, SnapshotManager};
use crate::models::SearchHit;
use crate::observability::{SearchMetrics, Timer};
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{
    BooleanQuery, EmptyQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, QueryParser, RegexQuery,
    TermQuery,
};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{DocAddress, Score, TantivyDocument, Term};
use tracing::{debug, warn};

/// Maximum edit distance accepted by the fuzzy clause.
pub const FUZZY_MAX_EDITS: u8 = 2;

/// Runs searches against the latest snapshot of the customer index.
///
/// A document matches when any of the three clauses matches; its score is
/// the sum of the scores of every clause it matched, so documents hit by
/// several strategies rank above those hit by one.
pub struct QueryEvaluator {
    snapshots: Arc<SnapshotManager>,
    fields: CustomerFields,
    parser: QueryParser,
    metrics: SearchMetrics,
}

impl QueryEvaluator {
    pub fn new(
        store: &CustomerIndex,
        snapshots: Arc<SnapshotManager>,
        metrics: SearchMetrics,
    ) -> Self {
        let fields = store.fields();
        let parser = QueryParser::for_index(store.index(), vec![fields.full_name]);
        Self {
            snapshots,
            fields,
            parser,
            metrics,
        }
    }

    /// Search for customers matching `search_term`.
    ///
    /// A blank term returns no results without acquiring a snapshot.
    /// Results are ordered by descending score, ties by document order.
    pub fn search(&self, search_term: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        let term = search_term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        if max_results == 0 {
            return Err(SearchError::InvalidParameters(
                "max_results must be greater than zero".to_string(),
            ));
        }

        let timer = Timer::new("customer_search");

        if let Err(e) = self.snapshots.maybe_refresh() {
            warn!(error = %e, "Snapshot refresh failed, searching the cached generation");
        }
        let snapshot = self.snapshots.acquire();
        let result = self.execute(&snapshot, term, max_results);
        self.snapshots.release(snapshot);

        let hits = result?;
        self.metrics.track_search_query(timer.finish(), hits.len());
        Ok(hits)
    }

    fn execute(
        &self,
        snapshot: &Snapshot,
        term: &str,
        max_results: usize,
    ) -> SearchResult<Vec<SearchHit>> {
        let query = self.build_query(term);
        let searcher = snapshot.searcher();

        let (mut ranked, total_hits): (Vec<(Score, DocAddress)>, usize) =
            searcher.search(&query, &(TopDocs::with_limit(max_results), Count))?;
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let mut hits = Vec::with_capacity(ranked.len());
        for (score, address) in ranked {
            let doc: TantivyDocument = searcher.doc(address)?;
            let key = doc.get_first(self.fields.key).and_then(|v| v.as_str());
            let full_name = doc.get_first(self.fields.full_name).and_then(|v| v.as_str());

            match (key, full_name) {
                (Some(key), Some(full_name)) => hits.push(SearchHit {
                    key: key.to_string(),
                    full_name: full_name.to_string(),
                    score: score.max(0.0),
                }),
                _ => warn!(?address, "Skipping stored document without key or full name"),
            }
        }

        debug!(
            term = %term,
            total_hits = total_hits,
            returned = hits.len(),
            generation = %snapshot.generation(),
            "Customer search executed"
        );
        Ok(hits)
    }

    /// Build the disjunction of the exact, prefix and fuzzy clauses.
    ///
    /// If the exact clause cannot be parsed, it is replaced by the analyzed
    /// tokens of the raw text as plain term queries; prefix and fuzzy
    /// clauses are built either way.
    pub fn build_query(&self, term: &str) -> BooleanQuery {
        let normalized = term.trim().to_lowercase();

        let exact = match self.exact_query(term) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "Matching literal terms instead of the parsed query");
                self.metrics.track_query_fallback();
                self.literal_terms_query(term)
            }
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Should, exact)];
        if let Some(prefix) = self.prefix_query(&normalized) {
            clauses.push((Occur::Should, prefix));
        }
        clauses.push((Occur::Should, self.fuzzy_query(&normalized)));

        BooleanQuery::new(clauses)
    }

    /// Parse `term` with the same analyzer used at index time.
    ///
    /// Only term and phrase matches on the full name are accepted. Parser
    /// syntax that yields anything else (`*`, ranges, `customer_key:...`,
    /// boosts) fails like unparseable text.
    pub fn exact_query(&self, term: &str) -> SearchResult<Box<dyn Query>> {
        let query = self
            .parser
            .parse_query(term)
            .map_err(|e| SearchError::QueryParseFailed(e.to_string()))?;

        if !self.matches_name_terms_only(query.as_ref()) {
            return Err(SearchError::QueryParseFailed(format!(
                "unsupported query syntax in {:?}",
                term
            )));
        }
        Ok(query)
    }

    fn matches_name_terms_only(&self, query: &dyn Query) -> bool {
        if let Some(boolean) = query.downcast_ref::<BooleanQuery>() {
            return boolean
                .clauses()
                .iter()
                .all(|(_, clause)| self.matches_name_terms_only(clause.as_ref()));
        }
        if let Some(term_query) = query.downcast_ref::<TermQuery>() {
            return term_query.term().field() == self.fields.full_name;
        }
        if let Some(phrase) = query.downcast_ref::<PhraseQuery>() {
            return phrase.field() == self.fields.full_name;
        }
        query.downcast_ref::<EmptyQuery>().is_some()
    }

    fn literal_terms_query(&self, term: &str) -> Box<dyn Query> {
        let clauses: Vec<(Occur, Box<dyn Query>)> = analyze(term)
            .iter()
            .map(|token| {
                let query: Box<dyn Query> = Box::new(TermQuery::new(
                    Term::from_field_text(self.fields.full_name, token),
                    IndexRecordOption::WithFreqs,
                ));
                (Occur::Should, query)
            })
            .collect();
        Box::new(BooleanQuery::new(clauses))
    }

    fn prefix_query(&self, normalized: &str) -> Option<Box<dyn Query>> {
        let pattern = format!("{}.*", regex::escape(normalized));
        match RegexQuery::from_pattern(&pattern, self.fields.full_name) {
            Ok(query) => Some(Box::new(query)),
            Err(e) => {
                warn!(error = %e, pattern = %pattern, "Skipping prefix clause");
                None
            }
        }
    }

    fn fuzzy_query(&self, normalized: &str) -> Box<dyn Query> {
        let term = Term::from_field_text(self.fields.full_name, normalized);
        Box::new(FuzzyTermQuery::new(term, FUZZY_MAX_EDITS, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexedCustomer;

    fn evaluator_with(customers: Vec<IndexedCustomer>) -> (QueryEvaluator, SearchMetrics) {
        let store = Arc::new(CustomerIndex::open_in_ram(15_000_000).unwrap());
        store.replace_all(customers).unwrap();
        let snapshots = Arc::new(SnapshotManager::new(store.clone()).unwrap());
        let metrics = SearchMetrics::new();
        (
            QueryEvaluator::new(&store, snapshots, metrics.clone()),
            metrics,
        )
    }

    fn alice_and_alicia() -> Vec<IndexedCustomer> {
        vec![
            IndexedCustomer::new("0000000001", "Alice Johnson"),
            IndexedCustomer::new("0000000002", "Alicia Jones"),
        ]
    }

    #[test]
    fn test_blank_term_returns_nothing() {
        let (evaluator, metrics) = evaluator_with(alice_and_alicia());
        assert!(evaluator.search("", 10).unwrap().is_empty());
        assert!(evaluator.search("   ", 10).unwrap().is_empty());
        assert_eq!(metrics.searches_total(), 0);
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let (evaluator, _) = evaluator_with(alice_and_alicia());
        let result = evaluator.search("alice", 0);
        assert!(matches!(result, Err(SearchError::InvalidParameters(_))));
    }

    #[test]
    fn test_exact_prefix_and_fuzzy_scores_add_up() {
        let (evaluator, _) = evaluator_with(alice_and_alicia());

        let hits = evaluator.search("Alice", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "0000000001");
        assert_eq!(hits[1].key, "0000000002");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let (evaluator, _) = evaluator_with(alice_and_alicia());

        let hits = evaluator.search("ALI", 10).unwrap();
        let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
        assert!(keys.contains(&"0000000001"));
        assert!(keys.contains(&"0000000002"));
    }

    #[test]
    fn test_unparseable_text_falls_back_to_literal_terms() {
        let (evaluator, metrics) = evaluator_with(alice_and_alicia());

        assert!(matches!(
            evaluator.exact_query("nosuchfield:alice"),
            Err(SearchError::QueryParseFailed(_))
        ));

        let hits = evaluator.search("nosuchfield:alice", 10).unwrap();
        assert_eq!(hits[0].key, "0000000001");
        assert_eq!(metrics.query_fallbacks_total(), 1);
    }

    fn customer_keys(evaluator: &QueryEvaluator, term: &str) -> Vec<String> {
        evaluator
            .search(term, 10)
            .unwrap()
            .into_iter()
            .map(|h| h.key)
            .collect()
    }

    fn alice_and_bob() -> Vec<IndexedCustomer> {
        vec![
            IndexedCustomer::new("1", "Alice Johnson"),
            IndexedCustomer::new("2", "Bob Stone"),
        ]
    }

    #[test]
    fn test_wildcard_does_not_match_everything() {
        let (evaluator, metrics) = evaluator_with(alice_and_bob());

        assert!(customer_keys(&evaluator, "*").is_empty());
        assert_eq!(customer_keys(&evaluator, "bob OR *"), vec!["2"]);
        assert_eq!(metrics.query_fallbacks_total(), 2);
    }

    #[test]
    fn test_other_fields_are_not_searchable() {
        let (evaluator, _) = evaluator_with(alice_and_bob());

        assert!(matches!(
            evaluator.exact_query("customer_key:1"),
            Err(SearchError::QueryParseFailed(_))
        ));
        assert!(customer_keys(&evaluator, "customer_key:1").is_empty());
        assert!(customer_keys(&evaluator, "customer_key:2 OR customer_key:1").is_empty());
    }

    #[test]
    fn test_range_syntax_does_not_widen_results() {
        let (evaluator, _) = evaluator_with(alice_and_bob());

        assert!(customer_keys(&evaluator, "full_name:[a TO z]").is_empty());
        assert!(customer_keys(&evaluator, "customer_key:[0 TO 9]").is_empty());
    }

    #[test]
    fn test_plain_terms_and_phrases_still_parse() {
        let (evaluator, _) = evaluator_with(alice_and_bob());

        assert!(evaluator.exact_query("alice").is_ok());
        assert!(evaluator.exact_query("alice bob").is_ok());
        assert!(evaluator.exact_query("\"alice johnson\"").is_ok());
        assert!(evaluator.exact_query("full_name:alice").is_ok());
        assert_eq!(customer_keys(&evaluator, "full_name:bob"), vec!["2"]);
    }

    #[test]
    fn test_regex_metacharacters_do_not_break_search() {
        let (evaluator, _) = evaluator_with(alice_and_alicia());

        for term in ["(alice", "alice*", "[jones", "a+b", "\\", "\"alice"] {
            assert!(evaluator.search(term, 10).is_ok(), "search for {:?} failed", term);
        }
    }
}
