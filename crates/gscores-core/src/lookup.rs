//! # Lookup Module
//!
//! Single-candidate score sheet lookup.

use crate::store::ScoreStore;
use crate::{CandidateId, GScoresError, Score};

/// One line of a score sheet: subject display name and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectScore {
    pub name: String,
    pub score: Option<Score>,
}

/// A candidate's full score sheet, with subject names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSheet {
    pub candidate_id: CandidateId,
    pub foreign_language_id: Option<String>,
    /// Every stored entry in order, including subjects not taken.
    pub subjects: Vec<SubjectScore>,
}

/// Fetch a candidate's score sheet.
///
/// # Errors
/// - `CandidateNotFound` if no student has this registration number
/// - `SubjectNotFound` if a stored entry references a missing subject
pub fn search_scores<S: ScoreStore + ?Sized>(
    store: &S,
    candidate: &CandidateId,
) -> Result<ScoreSheet, GScoresError> {
    let student = store
        .student(candidate)?
        .ok_or_else(|| GScoresError::CandidateNotFound(candidate.to_string()))?;

    let subjects = student
        .scores
        .iter()
        .map(|entry| {
            let subject = store
                .subject(entry.subject)
                .ok_or(GScoresError::SubjectNotFound(entry.subject))?;
            Ok(SubjectScore {
                name: subject.name,
                score: entry.score,
            })
        })
        .collect::<Result<Vec<_>, GScoresError>>()?;

    Ok(ScoreSheet {
        candidate_id: student.candidate_id,
        foreign_language_id: student.foreign_language_id,
        subjects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::seed::parse_row;
    use crate::store::MemoryStore;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        let ids = catalog::install(&mut store).expect("install");
        let student = parse_row("01000001,8.4,6.75,8.4,,,,6,5.25,5,N1", 2)
            .expect("parse")
            .into_student(&ids);
        store.insert_students(&[student]).expect("insert");
        store
    }

    #[test]
    fn search_scores_joins_subject_names() {
        let store = seeded();
        let id = CandidateId::parse("01000001").expect("id");

        let sheet = search_scores(&store, &id).expect("found");
        assert_eq!(sheet.candidate_id, id);
        assert_eq!(sheet.foreign_language_id.as_deref(), Some("N1"));
        assert_eq!(sheet.subjects.len(), 9);
        assert_eq!(sheet.subjects[0].name, "Toán");
        assert_eq!(sheet.subjects[0].score, Score::parse("8.4").ok());
        assert_eq!(sheet.subjects[3].name, "Vật Lý");
        assert_eq!(sheet.subjects[3].score, None);
    }

    #[test]
    fn search_scores_unknown_candidate() {
        let store = seeded();
        let id = CandidateId::parse("09999999").expect("id");

        let result = search_scores(&store, &id);
        assert!(matches!(result, Err(GScoresError::CandidateNotFound(_))));
    }
}
