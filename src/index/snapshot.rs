//! Point-in-time read handles over the customer index.
//!
//! The manager keeps one cached [`Snapshot`] of the latest committed
//! generation it has seen. Refreshing swaps that cached handle; snapshots
//! already handed out keep their own segment readers and stay valid.

use super::store::CustomerIndex;
use super::IndexGeneration;
use crate::error::SearchResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tantivy::{IndexReader, ReloadPolicy, Searcher};
use tracing::debug;

/// A reader's view of one committed generation.
///
/// Cloning is cheap. The documents and term data behind a snapshot never
/// change, even if the index is rebuilt while it is held.
#[derive(Clone)]
pub struct Snapshot {
    searcher: Searcher,
    generation: IndexGeneration,
}

impl Snapshot {
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn generation(&self) -> IndexGeneration {
        self.generation
    }

    /// Number of documents visible in this snapshot.
    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("generation", &self.generation)
            .field("num_docs", &self.num_docs())
            .finish()
    }
}

/// Hands out snapshots of the latest committed generation.
pub struct SnapshotManager {
    store: Arc<CustomerIndex>,
    reader: IndexReader,
    current: RwLock<Snapshot>,
    refresh_lock: Mutex<()>,
    outstanding: AtomicUsize,
}

impl SnapshotManager {
    pub fn new(store: Arc<CustomerIndex>) -> SearchResult<Self> {
        let reader: IndexReader = store
            .index()
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        let current = Snapshot {
            searcher: reader.searcher(),
            generation: store.generation(),
        };

        Ok(Self {
            store,
            reader,
            current: RwLock::new(current),
            refresh_lock: Mutex::new(()),
            outstanding: AtomicUsize::new(0),
        })
    }

    /// Return the most recently refreshed snapshot.
    pub fn acquire(&self) -> Snapshot {
        let snapshot = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        snapshot
    }

    /// Give a snapshot back. Only affects [`outstanding`](Self::outstanding).
    pub fn release(&self, snapshot: Snapshot) {
        drop(snapshot);
        // Never underflows even if a caller releases a clone it did not acquire.
        let _ = self
            .outstanding
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Swap in a new snapshot if the store committed a newer generation.
    ///
    /// Returns `true` when a refresh happened. Blocks only on a concurrent
    /// refresh, never on readers of older snapshots.
    pub fn maybe_refresh(&self) -> SearchResult<bool> {
        if self.store.generation() <= self.current_generation() {
            return Ok(false);
        }

        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Read the committed generation before reloading so the label can
        // only lag the content, never lead it.
        let committed = self.store.generation();
        let cached = self.current_generation();
        if committed <= cached {
            return Ok(false);
        }

        self.reader.reload()?;
        let refreshed = Snapshot {
            searcher: self.reader.searcher(),
            generation: committed,
        };
        debug!(
            from = %cached,
            to = %committed,
            num_docs = refreshed.num_docs(),
            "Refreshed search snapshot"
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = refreshed;
        Ok(true)
    }

    /// Generation of the cached snapshot.
    pub fn current_generation(&self) -> IndexGeneration {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Snapshots acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }
}
