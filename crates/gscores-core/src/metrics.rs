//! # Metrics Module
//!
//! Dataset size counters reported by `/status` and `gscores status`.

use crate::GScoresError;
use crate::store::ScoreStore;

/// Counts of what a store currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetMetrics {
    pub groups: usize,
    pub subjects: usize,
    pub students: usize,
}

impl DatasetMetrics {
    /// Create new metrics with all zeros.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute metrics from a store.
    pub fn from_store<S: ScoreStore + ?Sized>(store: &S) -> Result<Self, GScoresError> {
        Ok(Self {
            groups: store.groups().len(),
            subjects: store.subjects().len(),
            students: store.student_count()?,
        })
    }

    /// True once at least one student has been seeded.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.students > 0
    }
}
