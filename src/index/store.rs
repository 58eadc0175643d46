//! On-disk customer index and its single writer.
//!
//! The store owns the tantivy `Index` and the one `IndexWriter` allowed to
//! mutate it. A rebuild replaces the entire committed content in a single
//! writer transaction: delete all, add every record, commit. Readers only
//! ever see committed generations.

use super::schema::{build_schema, fields_from_schema, register_analyzer, CustomerFields};
use super::IndexGeneration;
use crate::error::{SearchError, SearchResult};
use crate::models::IndexedCustomer;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, TryLockError};
use std::time::Instant;
use tantivy::directory::MmapDirectory;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, error, info, warn};

/// Customer search index with exclusive write access.
///
/// Only one `replace_all` may run at a time. A concurrent call is rejected
/// with [`SearchError::WriterBusy`] instead of being queued, so callers such
/// as the rebuild scheduler can skip a cycle rather than pile up behind a
/// slow rebuild.
pub struct CustomerIndex {
    index: Index,
    fields: CustomerFields,
    writer: Mutex<IndexWriter>,
    generation: AtomicU64,
    path: Option<PathBuf>,
}

impl CustomerIndex {
    /// Open the index at `path`, creating the directory and an empty index
    /// if none exists yet.
    pub fn open(path: &Path, writer_memory_bytes: usize) -> SearchResult<Self> {
        std::fs::create_dir_all(path).map_err(|e| unavailable(path, e))?;
        let directory = MmapDirectory::open(path).map_err(|e| unavailable(path, e))?;
        let index =
            Index::open_or_create(directory, build_schema()).map_err(|e| unavailable(path, e))?;

        info!(path = %path.display(), "Opened customer search index");
        Self::from_index(index, writer_memory_bytes, Some(path.to_path_buf()))
    }

    /// Create an index that lives only in memory.
    pub fn open_in_ram(writer_memory_bytes: usize) -> SearchResult<Self> {
        let index = Index::create_in_ram(build_schema());
        Self::from_index(index, writer_memory_bytes, None)
    }

    fn from_index(
        index: Index,
        writer_memory_bytes: usize,
        path: Option<PathBuf>,
    ) -> SearchResult<Self> {
        register_analyzer(&index);
        let fields = fields_from_schema(&index.schema())?;

        // One indexing thread keeps document order equal to insertion order.
        let writer = index
            .writer_with_num_threads(1, writer_memory_bytes)
            .map_err(|e| SearchError::StoreUnavailable(format!("create index writer: {}", e)))?;

        Ok(Self {
            index,
            fields,
            writer: Mutex::new(writer),
            generation: AtomicU64::new(0),
            path,
        })
    }

    /// Replace the committed content with `records` and publish a new generation.
    ///
    /// Empty input is valid and commits an empty generation. If any record
    /// cannot be indexed, or the commit fails, the writer is rolled back and
    /// the previous generation stays the latest visible one.
    pub fn replace_all<I>(&self, records: I) -> SearchResult<IndexGeneration>
    where
        I: IntoIterator<Item = IndexedCustomer>,
    {
        let mut writer = match self.writer.try_lock() {
            Ok(writer) => writer,
            Err(TryLockError::WouldBlock) => return Err(SearchError::WriterBusy),
            Err(TryLockError::Poisoned(poisoned)) => {
                warn!("Index writer lock poisoned by an earlier rebuild, rolling back");
                let mut writer = poisoned.into_inner();
                writer.rollback().map_err(rebuild_failed)?;
                writer
            }
        };

        let start = Instant::now();
        match self.write_all(&mut writer, records) {
            Ok(count) => {
                let generation =
                    IndexGeneration::new(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
                info!(
                    generation = %generation,
                    documents = count,
                    duration_ms = start.elapsed().as_millis(),
                    "Committed customer index generation"
                );
                Ok(generation)
            }
            Err(e) => {
                if let Err(rollback_err) = writer.rollback() {
                    error!(error = %rollback_err, "Rolling back index writer failed");
                }
                warn!(
                    error = %e,
                    generation = %self.generation(),
                    "Index rebuild aborted, previous generation kept"
                );
                Err(e)
            }
        }
    }

    fn write_all<I>(&self, writer: &mut IndexWriter, records: I) -> SearchResult<usize>
    where
        I: IntoIterator<Item = IndexedCustomer>,
    {
        // Not visible to readers until the commit below.
        writer.delete_all_documents().map_err(rebuild_failed)?;

        let mut count = 0;
        for customer in records {
            if !customer.is_indexable() {
                return Err(SearchError::RebuildFailed(format!(
                    "customer record #{} (key {:?}) is missing its key or full name",
                    count, customer.key
                )));
            }
            writer
                .add_document(doc!(
                    self.fields.key => customer.key,
                    self.fields.full_name => customer.full_name,
                ))
                .map_err(rebuild_failed)?;
            count += 1;
        }

        debug!(documents = count, "Committing customer documents");
        writer.commit().map_err(rebuild_failed)?;
        Ok(count)
    }

    /// Latest committed generation. Zero until the first commit of this process.
    pub fn generation(&self) -> IndexGeneration {
        IndexGeneration::new(self.generation.load(Ordering::SeqCst))
    }

    /// Number of documents in the latest committed state.
    pub fn num_docs(&self) -> SearchResult<u64> {
        let reader: IndexReader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(reader.searcher().num_docs())
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn fields(&self) -> CustomerFields {
        self.fields
    }

    /// Directory of the index, `None` for in-memory indexes.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::fmt::Debug for CustomerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerIndex")
            .field("path", &self.path)
            .field("generation", &self.generation())
            .finish()
    }
}

fn unavailable(path: &Path, err: impl Display) -> SearchError {
    SearchError::StoreUnavailable(format!("{}: {}", path.display(), err))
}

fn rebuild_failed(err: impl Display) -> SearchError {
    SearchError::RebuildFailed(err.to_string())
}
