//! # Ranking Module
//!
//! Leaderboard over the math + physics + chemistry sum.
//!
//! Only students with a score in all three subjects are ranked. Order is
//! total descending, then registration number ascending so equal totals
//! always come out the same way. Selection keeps a bounded min-heap, so a
//! full scan needs `O(limit)` memory.

use crate::catalog::RANKING_SUBJECTS;
use crate::primitives::MAX_RANKING_LIMIT;
use crate::store::ScoreStore;
use crate::{CandidateId, GScoresError, Score, TotalScore};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStudent {
    pub candidate_id: CandidateId,
    pub math: Score,
    pub physics: Score,
    pub chemistry: Score,
    pub total: TotalScore,
}

/// Heap entry ordered so that a better rank compares greater.
#[derive(Debug)]
struct Ranked(RankedStudent);

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .total
            .cmp(&other.0.total)
            .then_with(|| other.0.candidate_id.cmp(&self.0.candidate_id))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Return the best `limit` students by math + physics + chemistry.
///
/// `limit` is capped at `MAX_RANKING_LIMIT`. If any of the three subjects is
/// missing from the catalog the leaderboard is empty.
pub fn top_ranking<S: ScoreStore + ?Sized>(
    store: &S,
    limit: usize,
) -> Result<Vec<RankedStudent>, GScoresError> {
    let limit = limit.min(MAX_RANKING_LIMIT);
    let [math_code, physics_code, chemistry_code] = RANKING_SUBJECTS;
    let (Some(math), Some(physics), Some(chemistry)) = (
        store.subject_by_code(math_code),
        store.subject_by_code(physics_code),
        store.subject_by_code(chemistry_code),
    ) else {
        return Ok(Vec::new());
    };
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(limit + 1);

    store.for_each_student(&mut |student| {
        let (Some(m), Some(p), Some(c)) = (
            student.score_for(math.id),
            student.score_for(physics.id),
            student.score_for(chemistry.id),
        ) else {
            return;
        };
        heap.push(Reverse(Ranked(RankedStudent {
            candidate_id: student.candidate_id.clone(),
            math: m,
            physics: p,
            chemistry: c,
            total: TotalScore::sum(&[m, p, c]),
        })));
        if heap.len() > limit {
            heap.pop();
        }
    })?;

    // Ascending over Reverse<_> is best rank first.
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(Ranked(row))| row)
        .collect())
}

// =============================================================================
// TESTS
// =============================================================================
