//! # Seed Module
//!
//! CSV ingestion for the exam dataset.
//!
//! - Parse fixed-order CSV rows into students
//! - Skip the header line and blank lines
//! - Skip (and report) malformed rows instead of inserting them
//! - Write students in fixed-size batches, one store transaction each
//!
//! ## Row format
//!
//! ```text
//! sbd,toan,ngu_van,ngoai_ngu,vat_li,hoa_hoc,sinh_hoc,lich_su,dia_li,gdcd,ma_ngoai_ngu
//! 01000001,8.4,6.75,8.4,,,,6,5.25,5,N1
//! ```
//!
//! Empty score fields mean the subject was not taken. The trailing language
//! code may be empty or missing altogether.

use crate::catalog::{self, CatalogIds};
use crate::primitives::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE, SCORE_COLUMNS};
use crate::store::ScoreStore;
use crate::{CandidateId, GScoresError, Score, ScoreEntry, Student};
use std::io::BufRead;

// =============================================================================
// ROW PARSING
// =============================================================================

/// One parsed CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub candidate_id: CandidateId,
    /// Scores in catalog column order.
    pub scores: [Option<Score>; SCORE_COLUMNS],
    pub foreign_language_id: Option<String>,
}

impl CsvRow {
    /// Build the stored student, mapping columns to subject ids.
    #[must_use]
    pub fn into_student(self, catalog: &CatalogIds) -> Student {
        let scores = catalog
            .columns()
            .iter()
            .zip(self.scores)
            .map(|(&subject, score)| ScoreEntry { subject, score })
            .collect();
        Student {
            candidate_id: self.candidate_id,
            foreign_language_id: self.foreign_language_id,
            scores,
        }
    }
}

/// Parse a single CSV data line.
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_row(line: &str, line_number: usize) -> Result<CsvRow, GScoresError> {
    let malformed = |reason: String| GScoresError::MalformedRow {
        line: line_number,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    // Registration number + scores, optionally followed by the language code.
    if fields.len() != SCORE_COLUMNS + 1 && fields.len() != SCORE_COLUMNS + 2 {
        return Err(malformed(format!(
            "expected {} or {} columns, found {}",
            SCORE_COLUMNS + 1,
            SCORE_COLUMNS + 2,
            fields.len()
        )));
    }

    let candidate_id = CandidateId::parse(fields[0]).map_err(|e| malformed(e.to_string()))?;

    let mut scores = [None; SCORE_COLUMNS];
    for (slot, raw) in scores.iter_mut().zip(&fields[1..=SCORE_COLUMNS]) {
        if !raw.is_empty() {
            *slot = Some(Score::parse(raw).map_err(|e| malformed(e.to_string()))?);
        }
    }

    let foreign_language_id = fields
        .get(SCORE_COLUMNS + 1)
        .filter(|code| !code.is_empty())
        .map(|code| (*code).to_string());

    Ok(CsvRow {
        candidate_id,
        scores,
        foreign_language_id,
    })
}

// =============================================================================
// SEEDER
// =============================================================================

/// Progress notifications emitted while seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedEvent {
    /// The catalog (groups and subjects) is in place.
    CatalogInstalled { groups: usize, subjects: usize },
    /// A batch was committed. `total` counts all students inserted so far.
    BatchInserted { inserted: usize, total: usize },
    /// A data row was skipped.
    RowSkipped { line: usize, reason: String },
}

/// Summary of a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Data rows read (header and blank lines excluded).
    pub rows_read: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub batches: usize,
}

/// Streams CSV rows into a store in fixed-size batches.
#[derive(Debug, Clone, Copy)]
pub struct Seeder {
    batch_size: usize,
}

impl Default for Seeder {
    fn default() -> Self {
        Self::new()
    }
}

impl Seeder {
    /// Create a seeder with the default batch size.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Create a seeder with a custom batch size, clamped to `1..=MAX_BATCH_SIZE`.
    #[must_use]
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    /// The effective batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Seed an empty store from CSV text.
    ///
    /// Installs the catalog, skips the first line (header), then inserts
    /// students `batch_size` rows at a time. The final partial batch is
    /// flushed at end of input.
    ///
    /// # Errors
    /// - `AlreadySeeded` if the store already holds students
    /// - `IoError` if reading the input fails (a row that is not valid
    ///   UTF-8 is skipped like any other malformed row)
    /// - any store error from a batch insert (e.g. `DuplicateCandidate`);
    ///   batches committed before the failure stay committed
    pub fn seed<S, R>(
        &self,
        store: &mut S,
        mut reader: R,
        observer: &mut dyn FnMut(&SeedEvent),
    ) -> Result<SeedReport, GScoresError>
    where
        S: ScoreStore + ?Sized,
        R: BufRead,
    {
        let existing = store.student_count()?;
        if existing > 0 {
            return Err(GScoresError::AlreadySeeded(existing));
        }

        let catalog = catalog::install(store)?;
        observer(&SeedEvent::CatalogInstalled {
            groups: store.groups().len(),
            subjects: store.subjects().len(),
        });

        let mut report = SeedReport::default();
        let mut batch: Vec<Student> = Vec::with_capacity(self.batch_size);

        let mut buf = Vec::new();
        let mut line_number = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| GScoresError::IoError(e.to_string()))?;
            if read == 0 {
                break;
            }
            line_number += 1;
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }

            if line_number == 1 || buf.trim_ascii().is_empty() {
                continue;
            }
            report.rows_read += 1;

            let parsed = std::str::from_utf8(&buf)
                .map_err(|e| GScoresError::MalformedRow {
                    line: line_number,
                    reason: format!("invalid UTF-8: {}", e),
                })
                .and_then(|line| parse_row(line, line_number));

            match parsed {
                Ok(row) => batch.push(row.into_student(&catalog)),
                Err(e) => {
                    report.skipped += 1;
                    observer(&SeedEvent::RowSkipped {
                        line: line_number,
                        reason: e.to_string(),
                    });
                }
            }

            if batch.len() >= self.batch_size {
                Self::flush(store, &mut batch, &mut report, observer)?;
            }
        }

        if !batch.is_empty() {
            Self::flush(store, &mut batch, &mut report, observer)?;
        }

        Ok(report)
    }

    fn flush<S: ScoreStore + ?Sized>(
        store: &mut S,
        batch: &mut Vec<Student>,
        report: &mut SeedReport,
        observer: &mut dyn FnMut(&SeedEvent),
    ) -> Result<(), GScoresError> {
        let inserted = store.insert_students(batch)?;
        batch.clear();
        report.inserted += inserted;
        report.batches += 1;
        observer(&SeedEvent::BatchInserted {
            inserted,
            total: report.inserted,
        });
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::io::Cursor;

    const HEADER: &str =
        "sbd,toan,ngu_van,ngoai_ngu,vat_li,hoa_hoc,sinh_hoc,lich_su,dia_li,gdcd,ma_ngoai_ngu";

    fn csv(rows: &[&str]) -> Cursor<String> {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        Cursor::new(text)
    }

    #[test]
    fn parse_row_full() {
        let row = parse_row("01000001,8.4,6.75,8.4,,,,6,5.25,5,N1", 2).expect("parse");
        assert_eq!(row.candidate_id.as_str(), "01000001");
        assert_eq!(row.scores[0], Score::parse("8.4").ok());
        assert_eq!(row.scores[3], None);
        assert_eq!(row.scores[8], Score::parse("5").ok());
        assert_eq!(row.foreign_language_id.as_deref(), Some("N1"));
    }

    #[test]
    fn parse_row_empty_language_and_crlf() {
        let row = parse_row("01000002,,,,,,,,,,\r", 3).expect("parse");
        assert!(row.scores.iter().all(Option::is_none));
        assert_eq!(row.foreign_language_id, None);
    }

    #[test]
    fn parse_row_missing_language_column() {
        let row = parse_row("01000003,1,2,3,4,5,6,7,8,9", 4).expect("parse");
        assert_eq!(row.foreign_language_id, None);
        assert_eq!(row.scores[8], Score::parse("9").ok());
    }

    #[test]
    fn parse_row_rejects_wrong_column_count() {
        let err = parse_row("01000001,8.4", 7).expect_err("short row");
        assert!(matches!(err, GScoresError::MalformedRow { line: 7, .. }));
        assert!(parse_row("01000001,1,2,3,4,5,6,7,8,9,N1,extra", 7).is_err());
    }

    #[test]
    fn parse_row_rejects_bad_fields() {
        assert!(parse_row("0100001,1,2,3,4,5,6,7,8,9,N1", 2).is_err());
        assert!(parse_row("01000001,x,2,3,4,5,6,7,8,9,N1", 2).is_err());
        assert!(parse_row("01000001,11,2,3,4,5,6,7,8,9,N1", 2).is_err());
    }

    #[test]
    fn into_student_follows_catalog_order() {
        let mut store = MemoryStore::new();
        let ids = catalog::install(&mut store).expect("install");
        let student = parse_row("01000001,1,2,3,4,5,6,7,8,9,N1", 2)
            .expect("parse")
            .into_student(&ids);

        assert_eq!(student.scores.len(), SCORE_COLUMNS);
        let physics = store.subject_by_code("vat_li").expect("subject");
        assert_eq!(student.score_for(physics.id), Score::parse("4").ok());
    }

    #[test]
    fn seed_skips_header_blank_and_malformed() {
        let mut store = MemoryStore::new();
        let input = csv(&[
            "01000001,8.4,6.75,8.4,,,,6,5.25,5,N1",
            "",
            "garbage",
            "01000002,8.6,8.5,7.2,,,,7.25,6,8,N1",
        ]);

        let mut skipped_lines = Vec::new();
        let report = Seeder::new()
            .seed(&mut store, input, &mut |event| {
                if let SeedEvent::RowSkipped { line, .. } = event {
                    skipped_lines.push(*line);
                }
            })
            .expect("seed");

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.batches, 1);
        assert_eq!(skipped_lines, vec![4]);
        assert_eq!(store.student_count().expect("count"), 2);
    }

    #[test]
    fn seed_skips_row_with_invalid_utf8() {
        let mut store = MemoryStore::new();
        let mut input = format!("{}\n01000001,5,5,5,5,5,5,5,5,5,N1\n", HEADER).into_bytes();
        input.extend_from_slice(b"01000002,6,6,6,6,6,6,6,6,6,N\xff\n");
        input.extend_from_slice(b"01000003,7,7,7,7,7,7,7,7,7,N1\n");

        let mut skipped_lines = Vec::new();
        let report = Seeder::with_batch_size(1)
            .seed(&mut store, Cursor::new(input), &mut |event| {
                if let SeedEvent::RowSkipped { line, .. } = event {
                    skipped_lines.push(*line);
                }
            })
            .expect("seed");

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.inserted, 2);
        assert_eq!(skipped_lines, vec![3]);
        let first = CandidateId::parse("01000001").expect("id");
        let third = CandidateId::parse("01000003").expect("id");
        assert!(store.contains_student(&first).expect("lookup"));
        assert!(store.contains_student(&third).expect("lookup"));
    }

    #[test]
    fn seed_flushes_in_batches() {
        let mut store = MemoryStore::new();
        let rows: Vec<String> = (0..5)
            .map(|i| format!("0100000{},5,5,5,5,5,5,5,5,5,N1", i))
            .collect();
        let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();

        let mut totals = Vec::new();
        let report = Seeder::with_batch_size(2)
            .seed(&mut store, csv(&row_refs), &mut |event| {
                if let SeedEvent::BatchInserted { total, .. } = event {
                    totals.push(*total);
                }
            })
            .expect("seed");

        assert_eq!(report.batches, 3);
        assert_eq!(totals, vec![2, 4, 5]);
        assert_eq!(store.student_count().expect("count"), 5);
    }

    #[test]
    fn seed_refuses_non_empty_store() {
        let mut store = MemoryStore::new();
        Seeder::new()
            .seed(
                &mut store,
                csv(&["01000001,5,5,5,5,5,5,5,5,5,N1"]),
                &mut |_| {},
            )
            .expect("first seed");

        let result = Seeder::new().seed(&mut store, csv(&[]), &mut |_| {});
        assert!(matches!(result, Err(GScoresError::AlreadySeeded(1))));
    }

    #[test]
    fn seed_aborts_on_duplicate_candidate() {
        let mut store = MemoryStore::new();
        let result = Seeder::new().seed(
            &mut store,
            csv(&[
                "01000001,5,5,5,5,5,5,5,5,5,N1",
                "01000001,6,6,6,6,6,6,6,6,6,N1",
            ]),
            &mut |_| {},
        );
        assert!(matches!(result, Err(GScoresError::DuplicateCandidate(_))));
    }

    #[test]
    fn batch_size_is_clamped() {
        assert_eq!(Seeder::with_batch_size(0).batch_size(), 1);
        assert_eq!(
            Seeder::with_batch_size(usize::MAX).batch_size(),
            MAX_BATCH_SIZE
        );
    }
}
