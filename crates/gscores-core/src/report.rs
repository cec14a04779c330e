//! # Report Module
//!
//! Score-band statistics per subject.
//!
//! Every non-null score falls into exactly one band:
//!
//! | Band | Range |
//! |---|---|
//! | excellent | `[8, 10]` |
//! | good | `[6, 8)` |
//! | average | `[4, 6)` |
//! | poor | `[0, 4)` |
//!
//! The report for a group is computed in one pass over all students.

use crate::primitives::{AVERAGE_FLOOR, EXCELLENT_FLOOR, GOOD_FLOOR};
use crate::store::ScoreStore;
use crate::{GScoresError, Score, SubjectId};
use std::collections::BTreeMap;

// =============================================================================
// BANDS
// =============================================================================

/// One of the four reporting ranges a score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    /// All bands, best first.
    pub const ALL: [ScoreBand; 4] = [Self::Excellent, Self::Good, Self::Average, Self::Poor];

    /// Classify a score.
    #[must_use]
    pub const fn of(score: Score) -> Self {
        let h = score.hundredths();
        if h >= EXCELLENT_FLOOR {
            Self::Excellent
        } else if h >= GOOD_FLOOR {
            Self::Good
        } else if h >= AVERAGE_FLOOR {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

/// Number of students per band for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandCounts {
    pub excellent: u64,
    pub good: u64,
    pub average: u64,
    pub poor: u64,
}

impl BandCounts {
    /// Count one score.
    pub fn record(&mut self, score: Score) {
        let slot = match ScoreBand::of(score) {
            ScoreBand::Excellent => &mut self.excellent,
            ScoreBand::Good => &mut self.good,
            ScoreBand::Average => &mut self.average,
            ScoreBand::Poor => &mut self.poor,
        };
        *slot = slot.saturating_add(1);
    }

    /// Count for a single band.
    #[must_use]
    pub const fn get(&self, band: ScoreBand) -> u64 {
        match band {
            ScoreBand::Excellent => self.excellent,
            ScoreBand::Good => self.good,
            ScoreBand::Average => self.average,
            ScoreBand::Poor => self.poor,
        }
    }

    /// Number of scores counted across all bands.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.excellent + self.good + self.average + self.poor
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Band counts for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectReport {
    /// Subject display name.
    pub subject: String,
    pub counts: BandCounts,
}

/// Build the score-band report for a group, or for every subject when
/// `group` is `None`.
///
/// Subjects appear in id (catalog) order. Null scores are not counted.
///
/// # Errors
/// - `GroupNotFound` if the named group does not exist
/// - `NoSubjects` if the group (or the whole catalog) has no subjects
pub fn score_report<S: ScoreStore + ?Sized>(
    store: &S,
    group: Option<&str>,
) -> Result<Vec<SubjectReport>, GScoresError> {
    let subjects = match group {
        Some(name) => {
            let group = store
                .group_by_name(name)
                .ok_or_else(|| GScoresError::GroupNotFound(name.to_string()))?;
            store.subjects_in_group(group.id)
        }
        None => store.subjects(),
    };
    if subjects.is_empty() {
        return Err(GScoresError::NoSubjects(group.unwrap_or("*").to_string()));
    }

    let slots: BTreeMap<SubjectId, usize> = subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| (subject.id, index))
        .collect();
    let mut counts = vec![BandCounts::default(); subjects.len()];

    store.for_each_student(&mut |student| {
        for entry in &student.scores {
            if let (Some(&slot), Some(score)) = (slots.get(&entry.subject), entry.score) {
                counts[slot].record(score);
            }
        }
    })?;

    Ok(subjects
        .into_iter()
        .zip(counts)
        .map(|(subject, counts)| SubjectReport {
            subject: subject.name,
            counts,
        })
        .collect())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::seed::parse_row;
    use crate::store::MemoryStore;

    fn score(raw: &str) -> Score {
        Score::parse(raw).expect("score")
    }

    fn seeded(rows: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let ids = catalog::install(&mut store).expect("install");
        let students: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(row, i + 2).expect("parse").into_student(&ids))
            .collect();
        store.insert_students(&students).expect("insert");
        store
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ScoreBand::of(score("10")), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(score("8")), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(score("7.99")), ScoreBand::Good);
        assert_eq!(ScoreBand::of(score("6")), ScoreBand::Good);
        assert_eq!(ScoreBand::of(score("5.99")), ScoreBand::Average);
        assert_eq!(ScoreBand::of(score("4")), ScoreBand::Average);
        assert_eq!(ScoreBand::of(score("3.99")), ScoreBand::Poor);
        assert_eq!(ScoreBand::of(score("0")), ScoreBand::Poor);
    }

    #[test]
    fn band_counts_record_and_total() {
        let mut counts = BandCounts::default();
        for raw in ["9", "8", "6.5", "4", "1"] {
            counts.record(score(raw));
        }
        assert_eq!(counts.get(ScoreBand::Excellent), 2);
        assert_eq!(counts.get(ScoreBand::Good), 1);
        assert_eq!(counts.get(ScoreBand::Average), 1);
        assert_eq!(counts.get(ScoreBand::Poor), 1);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn report_for_natural_group() {
        let store = seeded(&[
            "01000001,5,5,5,8.5,6,,,,,N1",
            "01000002,5,5,5,7,3.5,4,,,,N1",
            "01000003,5,5,5,,,,6,6,6,N1",
        ]);

        let report = score_report(&store, Some("natural")).expect("report");
        let names: Vec<&str> = report.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(names, vec!["Vật Lý", "Hóa Học", "Sinh Học"]);

        let physics = report[0].counts;
        assert_eq!(
            (physics.excellent, physics.good, physics.average, physics.poor),
            (1, 1, 0, 0)
        );
        let chemistry = report[1].counts;
        assert_eq!(
            (
                chemistry.excellent,
                chemistry.good,
                chemistry.average,
                chemistry.poor
            ),
            (0, 1, 0, 1)
        );
        let biology = report[2].counts;
        assert_eq!(biology.total(), 1);
        assert_eq!(biology.average, 1);
    }

    #[test]
    fn report_without_group_covers_all_subjects() {
        let store = seeded(&["01000001,5,5,5,5,5,5,5,5,5,N1"]);
        let report = score_report(&store, None).expect("report");
        assert_eq!(report.len(), 9);
        assert!(report.iter().all(|r| r.counts.average == 1));
    }

    #[test]
    fn report_unknown_group() {
        let store = seeded(&[]);
        let result = score_report(&store, Some("arts"));
        assert!(matches!(result, Err(GScoresError::GroupNotFound(_))));
    }

    #[test]
    fn report_group_without_subjects() {
        let mut store = seeded(&[]);
        store.upsert_group("arts").expect("group");
        let result = score_report(&store, Some("arts"));
        assert!(matches!(result, Err(GScoresError::NoSubjects(_))));
    }

    #[test]
    fn report_on_empty_dataset_is_all_zero() {
        let store = seeded(&[]);
        let report = score_report(&store, Some("core")).expect("report");
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|r| r.counts.total() == 0));
    }
}
