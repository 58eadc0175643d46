//! Customer search facade.
//!
//! Single entry point wiring the index store, snapshot manager, query
//! evaluator and rebuild scheduler together.

use crate::error::{SearchError, SearchResult};
use crate::index::{CustomerIndex, IndexGeneration, SnapshotManager};
use crate::models::SearchHit;
use crate::observability::{MetricsSnapshot, SearchMetrics};
use crate::repositories::CustomerRepository;
use crate::search::QueryEvaluator;
use crate::services::rebuild_scheduler::RebuildScheduler;
use crate::services::rebuild_service::{IndexRebuilder, RebuildReport};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Point-in-time view of the index and its background work.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub generation: IndexGeneration,
    pub documents: u64,
    pub background_rebuild_running: bool,
    pub last_rebuild: Option<RebuildReport>,
    pub metrics: MetricsSnapshot,
}

/// Customer search service trait.
#[async_trait]
pub trait CustomerSearchService: Send + Sync {
    /// Find customers whose name matches `term` exactly, by prefix or
    /// within two edits, best match first.
    ///
    /// A blank term yields no hits. `max_results` must be positive.
    async fn search(&self, term: &str, max_results: usize) -> SearchResult<Vec<SearchHit>>;

    /// Rebuild the index from the record source right away.
    ///
    /// Fails with [`SearchError::WriterBusy`] while another rebuild runs.
    async fn rebuild_now(&self) -> SearchResult<RebuildReport>;

    /// Begin periodic rebuilds. Returns false if they are already running.
    async fn start_background_rebuild(&self) -> bool;

    /// End periodic rebuilds, waiting for an in-flight rebuild to finish.
    /// Returns false if none were running.
    async fn stop_background_rebuild(&self) -> bool;

    async fn index_status(&self) -> SearchResult<IndexStatus>;

    /// Stop background work ahead of dropping the service.
    async fn shutdown(&self);
}

/// Run the first rebuild of a freshly started service.
///
/// A failure is logged and not returned: searches keep answering from the
/// previous generation and the background schedule retries on its next tick.
pub async fn rebuild_on_startup(service: &dyn CustomerSearchService) -> Option<RebuildReport> {
    match service.rebuild_now().await {
        Ok(report) => Some(report),
        Err(e) => {
            error!(error = %e, "Initial rebuild of the customer index failed");
            None
        }
    }
}

/// Default implementation of CustomerSearchService.
pub struct CustomerSearchServiceImpl {
    store: Arc<CustomerIndex>,
    evaluator: Arc<QueryEvaluator>,
    rebuilder: Arc<IndexRebuilder>,
    scheduler: Mutex<Option<RebuildScheduler>>,
    rebuild_interval: Duration,
    metrics: SearchMetrics,
}

impl CustomerSearchServiceImpl {
    /// Create a new customer search service over an opened store.
    pub fn new(
        store: Arc<CustomerIndex>,
        repository: Arc<dyn CustomerRepository>,
        rebuild_interval: Duration,
    ) -> SearchResult<Self> {
        let metrics = SearchMetrics::new();
        let snapshots = Arc::new(SnapshotManager::new(store.clone())?);
        let evaluator = Arc::new(QueryEvaluator::new(&store, snapshots, metrics.clone()));
        let rebuilder = Arc::new(IndexRebuilder::new(
            store.clone(),
            repository,
            metrics.clone(),
        ));

        Ok(Self {
            store,
            evaluator,
            rebuilder,
            scheduler: Mutex::new(None),
            rebuild_interval,
            metrics,
        })
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    pub fn rebuild_interval(&self) -> Duration {
        self.rebuild_interval
    }
}

#[async_trait]
impl CustomerSearchService for CustomerSearchServiceImpl {
    async fn search(&self, term: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        debug!(term, max_results, "Searching customers");

        let evaluator = self.evaluator.clone();
        let term = term.to_string();
        tokio::task::spawn_blocking(move || evaluator.search(&term, max_results))
            .await
            .map_err(|e| SearchError::Internal(format!("search task failed: {}", e)))?
    }

    async fn rebuild_now(&self) -> SearchResult<RebuildReport> {
        self.rebuilder.rebuild().await
    }

    async fn start_background_rebuild(&self) -> bool {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.as_ref().is_some_and(RebuildScheduler::is_running) {
            return false;
        }
        *scheduler = Some(RebuildScheduler::start(
            self.rebuilder.clone(),
            self.rebuild_interval,
        ));
        true
    }

    async fn stop_background_rebuild(&self) -> bool {
        let scheduler = self.scheduler.lock().await.take();
        match scheduler {
            Some(scheduler) => {
                scheduler.stop().await;
                true
            }
            None => false,
        }
    }

    async fn index_status(&self) -> SearchResult<IndexStatus> {
        let background_rebuild_running = self
            .scheduler
            .lock()
            .await
            .as_ref()
            .is_some_and(RebuildScheduler::is_running);

        Ok(IndexStatus {
            generation: self.store.generation(),
            documents: self.store.num_docs()?,
            background_rebuild_running,
            last_rebuild: self.rebuilder.last_report(),
            metrics: self.metrics.snapshot(),
        })
    }

    async fn shutdown(&self) {
        if self.stop_background_rebuild().await {
            info!("Background rebuild stopped");
        }
        info!("{}", self.metrics.summary());
    }
}
