//! # Score Store
//!
//! The storage contract for the G-Scores dataset.
//!
//! This module implements the `ScoreStore` trait and its in-memory backend.
//! All data structures use `BTreeMap` for deterministic ordering.

use crate::{CandidateId, GScoresError, Group, GroupId, Student, Subject, SubjectId};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SCORESTORE TRAIT
// =============================================================================

/// The ScoreStore trait defines the dataset operations.
///
/// Groups and subjects are small and always answered from memory, so their
/// accessors are infallible. Student access may touch disk and returns
/// `Result<T, GScoresError>` to support in-memory and persistent backends
/// uniformly.
pub trait ScoreStore {
    /// Insert a group by unique name. Returns the existing id if present.
    fn upsert_group(&mut self, name: &str) -> Result<GroupId, GScoresError>;

    /// Insert a subject by unique code. Returns the existing id if present.
    ///
    /// Fails with `GroupNotFound` if `group` does not exist.
    fn upsert_subject(
        &mut self,
        code: &str,
        name: &str,
        group: GroupId,
    ) -> Result<SubjectId, GScoresError>;

    /// Insert a batch of students atomically.
    ///
    /// The whole batch is validated before anything is written (see
    /// [`validate_batch`] for the rules). Returns the number of students
    /// inserted.
    fn insert_students(&mut self, students: &[Student]) -> Result<usize, GScoresError>;

    /// Remove every student. Groups and subjects are kept.
    fn clear_students(&mut self) -> Result<(), GScoresError>;

    /// Lookup a group by name.
    fn group_by_name(&self, name: &str) -> Option<Group>;

    /// Lookup a subject by id.
    fn subject(&self, id: SubjectId) -> Option<Subject>;

    /// Lookup a subject by code.
    fn subject_by_code(&self, code: &str) -> Option<Subject>;

    /// All groups, ordered by id.
    fn groups(&self) -> Vec<Group>;

    /// All subjects, ordered by id.
    fn subjects(&self) -> Vec<Subject>;

    /// Subjects belonging to a group, ordered by id.
    fn subjects_in_group(&self, group: GroupId) -> Vec<Subject> {
        self.subjects()
            .into_iter()
            .filter(|s| s.group == group)
            .collect()
    }

    /// Lookup a student by registration number.
    fn student(&self, candidate: &CandidateId) -> Result<Option<Student>, GScoresError>;

    /// Check if a student exists.
    fn contains_student(&self, candidate: &CandidateId) -> Result<bool, GScoresError> {
        Ok(self.student(candidate)?.is_some())
    }

    /// Visit every student in registration-number order.
    fn for_each_student(&self, visit: &mut dyn FnMut(&Student)) -> Result<(), GScoresError>;

    /// Get the total number of students.
    fn student_count(&self) -> Result<usize, GScoresError>;
}

/// Validate a student batch against a store before writing it.
///
/// Rejects:
/// - a registration number repeated inside the batch
/// - a registration number already present in the store
/// - a score entry referencing an unknown subject
pub fn validate_batch<S: ScoreStore + ?Sized>(
    store: &S,
    students: &[Student],
) -> Result<(), GScoresError> {
    let mut seen: BTreeSet<&CandidateId> = BTreeSet::new();
    for student in students {
        if !seen.insert(&student.candidate_id) || store.contains_student(&student.candidate_id)? {
            return Err(GScoresError::DuplicateCandidate(
                student.candidate_id.to_string(),
            ));
        }
        for entry in &student.scores {
            if store.subject(entry.subject).is_none() {
                return Err(GScoresError::SubjectNotFound(entry.subject));
            }
        }
    }
    Ok(())
}

// =============================================================================
// MEMORYSTORE IMPLEMENTATION
// =============================================================================

/// In-memory dataset.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Group storage: GroupId -> Group
    groups: BTreeMap<GroupId, Group>,

    /// Subject storage: SubjectId -> Subject
    subjects: BTreeMap<SubjectId, Subject>,

    /// Student storage keyed by registration number.
    students: BTreeMap<CandidateId, Student>,

    /// Next available group ID.
    next_group_id: u64,

    /// Next available subject ID.
    next_subject_id: u64,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn upsert_group(&mut self, name: &str) -> Result<GroupId, GScoresError> {
        if let Some(existing) = self.group_by_name(name) {
            return Ok(existing.id);
        }
        let id = GroupId(self.next_group_id);
        self.next_group_id = self.next_group_id.saturating_add(1);
        self.groups.insert(
            id,
            Group {
                id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    fn upsert_subject(
        &mut self,
        code: &str,
        name: &str,
        group: GroupId,
    ) -> Result<SubjectId, GScoresError> {
        if let Some(existing) = self.subject_by_code(code) {
            return Ok(existing.id);
        }
        if !self.groups.contains_key(&group) {
            return Err(GScoresError::GroupNotFound(format!("{:?}", group)));
        }
        let id = SubjectId(self.next_subject_id);
        self.next_subject_id = self.next_subject_id.saturating_add(1);
        self.subjects.insert(
            id,
            Subject {
                id,
                code: code.to_string(),
                name: name.to_string(),
                group,
            },
        );
        Ok(id)
    }

    fn insert_students(&mut self, students: &[Student]) -> Result<usize, GScoresError> {
        validate_batch(&*self, students)?;
        for student in students {
            self.students
                .insert(student.candidate_id.clone(), student.clone());
        }
        Ok(students.len())
    }

    fn clear_students(&mut self) -> Result<(), GScoresError> {
        self.students.clear();
        Ok(())
    }

    fn group_by_name(&self, name: &str) -> Option<Group> {
        self.groups.values().find(|g| g.name == name).cloned()
    }

    fn subject(&self, id: SubjectId) -> Option<Subject> {
        self.subjects.get(&id).cloned()
    }

    fn subject_by_code(&self, code: &str) -> Option<Subject> {
        self.subjects.values().find(|s| s.code == code).cloned()
    }

    fn groups(&self) -> Vec<Group> {
        self.groups.values().cloned().collect()
    }

    fn subjects(&self) -> Vec<Subject> {
        self.subjects.values().cloned().collect()
    }

    fn student(&self, candidate: &CandidateId) -> Result<Option<Student>, GScoresError> {
        Ok(self.students.get(candidate).cloned())
    }

    fn contains_student(&self, candidate: &CandidateId) -> Result<bool, GScoresError> {
        Ok(self.students.contains_key(candidate))
    }

    fn for_each_student(&self, visit: &mut dyn FnMut(&Student)) -> Result<(), GScoresError> {
        for student in self.students.values() {
            visit(student);
        }
        Ok(())
    }

    fn student_count(&self) -> Result<usize, GScoresError> {
        Ok(self.students.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Score, ScoreEntry};

    fn make_student(id: &str, subject: SubjectId, score: &str) -> Student {
        Student {
            candidate_id: CandidateId::parse(id).expect("id"),
            foreign_language_id: None,
            scores: vec![ScoreEntry {
                subject,
                score: Score::parse(score).ok(),
            }],
        }
    }

    fn store_with_subject() -> (MemoryStore, SubjectId) {
        let mut store = MemoryStore::new();
        let group = store.upsert_group("core").expect("group");
        let subject = store.upsert_subject("toan", "Toán", group).expect("subject");
        (store, subject)
    }

    #[test]
    fn upsert_group_returns_existing() {
        let mut store = MemoryStore::new();
        let first = store.upsert_group("core").expect("insert");
        let second = store.upsert_group("core").expect("insert");
        assert_eq!(first, second);
        assert_eq!(store.groups().len(), 1);
    }

    #[test]
    fn upsert_subject_requires_group() {
        let mut store = MemoryStore::new();
        let result = store.upsert_subject("toan", "Toán", GroupId(7));
        assert!(matches!(result, Err(GScoresError::GroupNotFound(_))));
    }

    #[test]
    fn insert_and_lookup_student() {
        let (mut store, subject) = store_with_subject();
        let student = make_student("01000001", subject, "8.4");

        let inserted = store
            .insert_students(std::slice::from_ref(&student))
            .expect("insert");
        assert_eq!(inserted, 1);

        let found = store.student(&student.candidate_id).expect("lookup");
        assert_eq!(found, Some(student));
        assert_eq!(store.student_count().expect("count"), 1);
    }

    #[test]
    fn insert_rejects_duplicate_within_batch() {
        let (mut store, subject) = store_with_subject();
        let batch = vec![
            make_student("01000001", subject, "1"),
            make_student("01000001", subject, "2"),
        ];
        let result = store.insert_students(&batch);
        assert!(matches!(result, Err(GScoresError::DuplicateCandidate(_))));
        assert_eq!(store.student_count().expect("count"), 0);
    }

    #[test]
    fn insert_rejects_duplicate_against_store() {
        let (mut store, subject) = store_with_subject();
        store
            .insert_students(&[make_student("01000001", subject, "1")])
            .expect("insert");

        let batch = vec![
            make_student("01000002", subject, "2"),
            make_student("01000001", subject, "3"),
        ];
        assert!(store.insert_students(&batch).is_err());
        // Batch is atomic: the valid first row was not written either.
        assert_eq!(store.student_count().expect("count"), 1);
    }

    #[test]
    fn insert_rejects_unknown_subject() {
        let (mut store, _) = store_with_subject();
        let result = store.insert_students(&[make_student("01000001", SubjectId(99), "1")]);
        assert!(matches!(
            result,
            Err(GScoresError::SubjectNotFound(SubjectId(99)))
        ));
    }

    #[test]
    fn for_each_student_is_ordered() {
        let (mut store, subject) = store_with_subject();
        store
            .insert_students(&[
                make_student("03000001", subject, "1"),
                make_student("01000001", subject, "2"),
                make_student("02000001", subject, "3"),
            ])
            .expect("insert");

        let mut seen = Vec::new();
        store
            .for_each_student(&mut |s| seen.push(s.candidate_id.to_string()))
            .expect("scan");
        assert_eq!(seen, vec!["01000001", "02000001", "03000001"]);
    }

    #[test]
    fn clear_students_keeps_catalog() {
        let (mut store, subject) = store_with_subject();
        store
            .insert_students(&[make_student("01000001", subject, "1")])
            .expect("insert");
        store.clear_students().expect("clear");

        assert_eq!(store.student_count().expect("count"), 0);
        assert!(store.subject(subject).is_some());
    }
}
