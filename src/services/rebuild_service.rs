//! One full index rebuild cycle: fetch every record, replace the index.

use crate::error::{SearchError, SearchResult};
use crate::index::{CustomerIndex, IndexGeneration};
use crate::observability::{SearchMetrics, Timer};
use crate::repositories::CustomerRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildReport {
    /// Generation published by the rebuild
    pub generation: IndexGeneration,

    /// Documents in the new generation
    pub documents: usize,

    /// Time spent fetching records from the repository
    pub fetch_ms: u128,

    /// Time spent writing and committing the index
    pub index_ms: u128,

    pub completed_at: DateTime<Utc>,
}

/// Rebuilds the customer index from the record source.
///
/// Shared by the background scheduler and by on-demand rebuilds; the
/// store's writer lock keeps the two from running at once.
pub struct IndexRebuilder {
    store: Arc<CustomerIndex>,
    repository: Arc<dyn CustomerRepository>,
    metrics: SearchMetrics,
    last_report: RwLock<Option<RebuildReport>>,
}

impl IndexRebuilder {
    pub fn new(
        store: Arc<CustomerIndex>,
        repository: Arc<dyn CustomerRepository>,
        metrics: SearchMetrics,
    ) -> Self {
        Self {
            store,
            repository,
            metrics,
            last_report: RwLock::new(None),
        }
    }

    /// Run one rebuild cycle.
    ///
    /// On error the previously committed generation stays authoritative.
    pub async fn rebuild(&self) -> SearchResult<RebuildReport> {
        info!("Start building the search index for customers");
        let timer = Timer::new("customer_index_rebuild");

        let result = self.run_cycle().await;
        match &result {
            Ok(report) => {
                self.metrics
                    .track_rebuild(timer.finish_with_status(true), report.documents, true);
                info!(
                    generation = %report.generation,
                    documents = report.documents,
                    fetch_ms = report.fetch_ms,
                    index_ms = report.index_ms,
                    "Finished building the search index for customers"
                );
                *self
                    .last_report
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
            }
            Err(SearchError::WriterBusy) => {
                self.metrics.track_rebuild_rejected();
                warn!("Another rebuild holds the index writer, rebuild rejected");
            }
            Err(_) => {
                self.metrics
                    .track_rebuild(timer.finish_with_status(false), 0, false);
            }
        }
        result
    }

    async fn run_cycle(&self) -> SearchResult<RebuildReport> {
        let fetch_start = Instant::now();
        let records = self.repository.fetch_all_records().await?;
        let fetch_ms = fetch_start.elapsed().as_millis();
        let documents = records.len();
        info!(
            customers = documents,
            duration_ms = fetch_ms,
            "Fetched customers to index"
        );

        let index_start = Instant::now();
        let store = self.store.clone();
        let generation = tokio::task::spawn_blocking(move || store.replace_all(records))
            .await
            .map_err(|e| SearchError::Internal(format!("rebuild task failed: {}", e)))??;

        Ok(RebuildReport {
            generation,
            documents,
            fetch_ms,
            index_ms: index_start.elapsed().as_millis(),
            completed_at: Utc::now(),
        })
    }

    /// Report of the most recent successful rebuild, if any.
    pub fn last_report(&self) -> Option<RebuildReport> {
        self.last_report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self) -> &Arc<CustomerIndex> {
        &self.store
    }
}
