//! # gscores-core
//!
//! The exam score dataset engine for G-Scores - THE LOGIC.
//!
//! This crate owns everything that does not need a network: the domain
//! model, the fixed subject catalog, CSV seeding, the storage backends and
//! the three read queries (candidate lookup, score-band report, leaderboard).
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: NO async, NO network dependencies, NO logging backend
//!   (seeding reports progress through a callback instead)
//! - Deterministic: `BTreeMap` ordering, fixed-point scores, stable tie-breaks
//! - Read-only after seeding: individual records are never updated or deleted

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod lookup;
pub mod metrics;
pub mod primitives;
pub mod ranking;
pub mod report;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CandidateId, GScoresError, Group, GroupId, Score, ScoreEntry, Student, Subject, SubjectId,
    TotalScore,
};

// =============================================================================
// RE-EXPORTS: Dataset Engine
// =============================================================================

pub use catalog::{CatalogIds, GroupName, RANKING_SUBJECTS, SUBJECTS, SubjectSpec};
pub use lookup::{ScoreSheet, SubjectScore, search_scores};
pub use metrics::DatasetMetrics;
pub use ranking::{RankedStudent, top_ranking};
pub use report::{BandCounts, ScoreBand, SubjectReport, score_report};
pub use repository::{Repository, StorageBackend};
pub use seed::{CsvRow, SeedEvent, SeedReport, Seeder, parse_row};
pub use storage::RedbStore;
pub use store::{MemoryStore, ScoreStore};
