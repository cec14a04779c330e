//! # Repository Module
//!
//! The single entry point the app layer talks to.
//!
//! ## Storage Backends
//!
//! A repository wraps one of two storage backends:
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage
//!
//! After seeding, every operation is a read, so a repository can be shared
//! behind an `Arc` without a lock.

use crate::lookup::{self, ScoreSheet};
use crate::metrics::DatasetMetrics;
use crate::ranking::{self, RankedStudent};
use crate::report::{self, SubjectReport};
use crate::seed::{SeedEvent, SeedReport, Seeder};
use crate::storage::RedbStore;
use crate::store::{MemoryStore, ScoreStore};
use crate::{CandidateId, GScoresError};
use std::io::BufRead;
use std::path::Path;

/// Storage backend for a Repository.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory dataset (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed dataset using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Score dataset plus the operations exposed over HTTP and the CLI.
#[derive(Debug, Default)]
pub struct Repository {
    backend: StorageBackend,
}

impl Repository {
    /// Create a new empty repository with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over an existing in-memory store.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create a repository with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, GScoresError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// The backend as a trait object.
    #[must_use]
    pub fn store(&self) -> &dyn ScoreStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    fn store_mut(&mut self) -> &mut dyn ScoreStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    // =========================================================================
    // SEEDING
    // =========================================================================

    /// Seed the dataset from CSV text. See [`Seeder::seed`].
    pub fn seed<R: BufRead>(
        &mut self,
        reader: R,
        batch_size: usize,
        observer: &mut dyn FnMut(&SeedEvent),
    ) -> Result<SeedReport, GScoresError> {
        Seeder::with_batch_size(batch_size).seed(self.store_mut(), reader, observer)
    }

    /// Delete every student so the dataset can be seeded again.
    ///
    /// The catalog is kept. Persistent files are compacted afterwards.
    pub fn reset(&mut self) -> Result<(), GScoresError> {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store.clear_students(),
            StorageBackend::Persistent(redb) => {
                redb.clear_students()?;
                redb.compact()
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Look up a candidate's score sheet by raw registration number.
    ///
    /// # Errors
    /// - `InvalidCandidateId` if `raw` is not 8 characters after trimming
    /// - `CandidateNotFound` if no such candidate exists
    pub fn search_scores(&self, raw: &str) -> Result<ScoreSheet, GScoresError> {
        let candidate = CandidateId::parse(raw)?;
        lookup::search_scores(self.store(), &candidate)
    }

    /// Score-band report for a group, or for every subject.
    pub fn score_report(&self, group: Option<&str>) -> Result<Vec<SubjectReport>, GScoresError> {
        report::score_report(self.store(), group)
    }

    /// Leaderboard by math + physics + chemistry.
    pub fn top_ranking(&self, limit: usize) -> Result<Vec<RankedStudent>, GScoresError> {
        ranking::top_ranking(self.store(), limit)
    }

    /// Current dataset counters.
    pub fn metrics(&self) -> Result<DatasetMetrics, GScoresError> {
        DatasetMetrics::from_store(self.store())
    }
}

// =============================================================================
// TESTS
// =============================================================================
