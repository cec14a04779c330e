//! # Dataset Primitives
//!
//! Hardcoded runtime constants for the G-Scores CORE.
//!
//! The exam dataset has a fixed shape: one registration number, nine subject
//! scores and an optional foreign-language code per candidate. These
//! constants are compiled into the binary and are immutable at runtime.

/// Exact length of a candidate registration number.
pub const CANDIDATE_ID_LENGTH: usize = 8;

/// Fixed-point scale for scores: one point is 100 hundredths.
pub const SCORE_SCALE: u16 = 100;

/// Highest valid score, in hundredths (10.00 points).
pub const MAX_SCORE_HUNDREDTHS: u16 = 10 * SCORE_SCALE;

// =============================================================================
// SCORE BANDS
// =============================================================================

/// Lower bound (inclusive) of the "excellent" band: `[8, 10]`.
pub const EXCELLENT_FLOOR: u16 = 8 * SCORE_SCALE;

/// Lower bound (inclusive) of the "good" band: `[6, 8)`.
pub const GOOD_FLOOR: u16 = 6 * SCORE_SCALE;

/// Lower bound (inclusive) of the "average" band: `[4, 6)`.
///
/// Everything below is "poor": `[0, 4)`.
pub const AVERAGE_FLOOR: u16 = 4 * SCORE_SCALE;

// =============================================================================
// SEEDING LIMITS
// =============================================================================

/// Number of CSV rows written per storage transaction.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Upper bound on the batch size a caller may request.
///
/// Keeps a single write transaction from buffering an unbounded number of rows.
pub const MAX_BATCH_SIZE: usize = 50_000;

/// Number of score columns between the registration number and the language code.
pub const SCORE_COLUMNS: usize = 9;

/// Default location of the seed dataset, relative to the working directory.
pub const DEFAULT_DATASET_PATH: &str = "dataset/diem_thi_thpt_2024.csv";

// =============================================================================
// RANKING LIMITS
// =============================================================================

/// Number of students on the leaderboard.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Maximum leaderboard size a caller may request.
pub const MAX_RANKING_LIMIT: usize = 100;
