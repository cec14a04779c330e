//! # Core Type Definitions
//!
//! This module contains all core types for the G-Scores dataset:
//! - Identifiers (`GroupId`, `SubjectId`, `CandidateId`)
//! - Fixed-point scores (`Score`, `TotalScore`)
//! - Persisted entities (`Group`, `Subject`, `Student`, `ScoreEntry`)
//! - Error types (`GScoresError`)
//!
//! ## Fixed-Point Scores
//!
//! Scores are stored as integer hundredths of a point. Sums are exact and
//! band boundaries compare without rounding error. Conversion to `f64`
//! happens only at the JSON boundary.

use crate::primitives::{CANDIDATE_ID_LENGTH, MAX_SCORE_HUNDREDTHS, SCORE_SCALE};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Internal identifier of a subject group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// Internal identifier of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub u64);

/// Candidate registration number.
///
/// Always exactly `CANDIDATE_ID_LENGTH` characters once constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(String);

impl CandidateId {
    /// Parse a registration number, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, GScoresError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() != CANDIDATE_ID_LENGTH {
            return Err(GScoresError::InvalidCandidateId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the registration number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// SCORES
// =============================================================================

/// A single subject score in hundredths of a point (`8.25` is `825`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Score(u16);

impl Score {
    /// Create a score from hundredths, rejecting values above 10 points.
    pub fn from_hundredths(hundredths: u16) -> Result<Self, GScoresError> {
        if hundredths > MAX_SCORE_HUNDREDTHS {
            return Err(GScoresError::InvalidScore(Self(hundredths).to_string()));
        }
        Ok(Self(hundredths))
    }

    /// Parse a decimal score such as `"8.25"`, `"7.4"` or `"10"`.
    ///
    /// At most two fractional digits are accepted. Signs, exponents and
    /// empty input are rejected.
    pub fn parse(raw: &str) -> Result<Self, GScoresError> {
        let invalid = || GScoresError::InvalidScore(raw.to_string());
        let text = raw.trim();

        let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_points: u16 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_hundredths: u16 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u16>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let hundredths = whole_points
            .checked_mul(SCORE_SCALE)
            .and_then(|w| w.checked_add(frac_hundredths))
            .ok_or_else(invalid)?;
        Self::from_hundredths(hundredths).map_err(|_| invalid())
    }

    /// Get the raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> u16 {
        self.0
    }

    /// The score as a decimal number of points, for JSON output.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn points(self) -> f64 {
        f64::from(self.0) / f64::from(SCORE_SCALE)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, u32::from(self.0))
    }
}

/// Sum of several subject scores, in hundredths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TotalScore(u32);

impl TotalScore {
    /// Sum the given scores exactly.
    #[must_use]
    pub fn sum(scores: &[Score]) -> Self {
        Self(scores.iter().map(|s| u32::from(s.hundredths())).sum())
    }

    /// Get the raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// The total as a decimal number of points, for JSON output.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn points(self) -> f64 {
        f64::from(self.0) / f64::from(SCORE_SCALE)
    }
}

impl fmt::Display for TotalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hundredths(f, self.0)
    }
}

/// Render hundredths the way the dashboard prints numbers: `8`, `8.5`, `8.25`.
fn write_hundredths(f: &mut fmt::Formatter<'_>, hundredths: u32) -> fmt::Result {
    let scale = u32::from(SCORE_SCALE);
    let whole = hundredths / scale;
    let frac = hundredths % scale;
    if frac == 0 {
        write!(f, "{}", whole)
    } else if frac % 10 == 0 {
        write!(f, "{}.{}", whole, frac / 10)
    } else {
        write!(f, "{}.{:02}", whole, frac)
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A subject group (core, foreign, natural, social).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// An exam subject, belonging to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    /// Unique short key, e.g. `toan`.
    pub code: String,
    /// Display name, e.g. `Toán`.
    pub name: String,
    pub group: GroupId,
}

/// One subject slot on a candidate's score sheet. `None` means not taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub subject: SubjectId,
    pub score: Option<Score>,
}

/// An exam candidate and their scores. Immutable after seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub candidate_id: CandidateId,
    pub foreign_language_id: Option<String>,
    pub scores: Vec<ScoreEntry>,
}

impl Student {
    /// The candidate's score for a subject, if they sat it.
    #[must_use]
    pub fn score_for(&self, subject: SubjectId) -> Option<Score> {
        self.scores
            .iter()
            .find(|entry| entry.subject == subject)
            .and_then(|entry| entry.score)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the G-Scores system.
///
/// The CORE never panics; every failure surfaces as one of these variants.
#[derive(Debug, Error)]
pub enum GScoresError {
    /// A registration number does not have the expected length.
    #[error("Invalid candidate id: {0:?} (expected 8 characters)")]
    InvalidCandidateId(String),

    /// A score is not a decimal between 0 and 10 with at most two decimals.
    #[error("Invalid score: {0:?}")]
    InvalidScore(String),

    /// No student with this registration number exists.
    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),

    /// No group with this name exists.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The group exists but has no subjects.
    #[error("No subjects in group: {0}")]
    NoSubjects(String),

    /// A score entry or subject upsert referenced an unknown id.
    #[error("Subject not found: {0:?}")]
    SubjectNotFound(SubjectId),

    /// A student with this registration number is already stored.
    #[error("Duplicate candidate: {0}")]
    DuplicateCandidate(String),

    /// Seeding was requested on a store that already holds students.
    #[error("Dataset already seeded with {0} students (reset first)")]
    AlreadySeeded(usize),

    /// A CSV row could not be turned into a student.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl GScoresError {
    /// Whether the error means "the requested record does not exist".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CandidateNotFound(_) | Self::GroupNotFound(_) | Self::NoSubjects(_)
        )
    }

    /// Whether the error was caused by caller input rather than the store.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidCandidateId(_) | Self::InvalidScore(_) | Self::MalformedRow { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_id_requires_eight_chars() {
        assert!(CandidateId::parse("01000001").is_ok());
        assert!(CandidateId::parse(" 01000001\r").is_ok());
        assert!(CandidateId::parse("0100001").is_err());
        assert!(CandidateId::parse("010000011").is_err());
        assert!(CandidateId::parse("").is_err());
    }

    #[test]
    fn score_parse_common_forms() {
        assert_eq!(Score::parse("8.25").expect("parse").hundredths(), 825);
        assert_eq!(Score::parse("7.4").expect("parse").hundredths(), 740);
        assert_eq!(Score::parse("10").expect("parse").hundredths(), 1000);
        assert_eq!(Score::parse("0").expect("parse").hundredths(), 0);
        assert_eq!(Score::parse(".5").expect("parse").hundredths(), 50);
        assert_eq!(Score::parse("6.").expect("parse").hundredths(), 600);
    }

    #[test]
    fn score_parse_rejects_garbage() {
        for raw in ["", ".", "abc", "-1", "10.01", "11", "8.125", "1e1", "8,5", "65536"] {
            assert!(Score::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn score_display_trims_trailing_zeros() {
        assert_eq!(Score::parse("8.25").expect("parse").to_string(), "8.25");
        assert_eq!(Score::parse("6.40").expect("parse").to_string(), "6.4");
        assert_eq!(Score::parse("9.00").expect("parse").to_string(), "9");
        assert_eq!(Score::parse("0.05").expect("parse").to_string(), "0.05");
    }

    #[test]
    fn total_score_is_exact() {
        let scores = [
            Score::parse("8.2").expect("parse"),
            Score::parse("7.75").expect("parse"),
            Score::parse("9.25").expect("parse"),
        ];
        let total = TotalScore::sum(&scores);
        assert_eq!(total.hundredths(), 2520);
        assert_eq!(total.to_string(), "25.2");
    }

    #[test]
    fn score_for_skips_missing_entries() {
        let student = Student {
            candidate_id: CandidateId::parse("01000001").expect("id"),
            foreign_language_id: None,
            scores: vec![
                ScoreEntry {
                    subject: SubjectId(1),
                    score: Score::parse("5").ok(),
                },
                ScoreEntry {
                    subject: SubjectId(2),
                    score: None,
                },
            ],
        };
        assert_eq!(student.score_for(SubjectId(1)), Score::parse("5").ok());
        assert_eq!(student.score_for(SubjectId(2)), None);
        assert_eq!(student.score_for(SubjectId(3)), None);
    }

    #[test]
    fn error_classification() {
        assert!(GScoresError::CandidateNotFound("x".into()).is_not_found());
        assert!(GScoresError::NoSubjects("x".into()).is_not_found());
        assert!(!GScoresError::IoError("x".into()).is_not_found());
        assert!(GScoresError::InvalidCandidateId("x".into()).is_invalid_input());
        assert!(!GScoresError::DuplicateCandidate("x".into()).is_invalid_input());
    }
}
