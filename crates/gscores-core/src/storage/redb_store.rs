//! # redb-backed Score Storage
//!
//! A disk-backed dataset store using the redb embedded database.
//!
//! Provides:
//! - ACID transactions (one per student batch)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Layout
//!
//! Records are postcard-encoded. Groups and subjects are tiny and are cached
//! in memory at open; students are always read from disk.

use crate::store::ScoreStore;
use crate::{CandidateId, GScoresError, Group, GroupId, Student, Subject, SubjectId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Table for groups: GroupId(u64) -> serialized Group bytes
const GROUPS: TableDefinition<u64, &[u8]> = TableDefinition::new("groups");

/// Table for subjects: SubjectId(u64) -> serialized Subject bytes
const SUBJECTS: TableDefinition<u64, &[u8]> = TableDefinition::new("subjects");

/// Table for students: registration number -> serialized Student bytes
const STUDENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("students");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_GROUP_ID: &str = "next_group_id";
const NEXT_SUBJECT_ID: &str = "next_subject_id";

fn storage_err(e: impl std::fmt::Display) -> GScoresError {
    GScoresError::IoError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GScoresError> {
    postcard::to_allocvec(value).map_err(|e| GScoresError::SerializationError(e.to_string()))
}

fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, GScoresError> {
    postcard::from_bytes(bytes).map_err(|e| GScoresError::SerializationError(e.to_string()))
}

/// A disk-backed dataset store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// In-memory copy of the groups table.
    groups: BTreeMap<GroupId, Group>,
    /// In-memory copy of the subjects table.
    subjects: BTreeMap<SubjectId, Subject>,
    /// Next available group ID.
    next_group_id: u64,
    /// Next available subject ID.
    next_subject_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("groups", &self.groups.len())
            .field("subjects", &self.subjects.len())
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a dataset database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GScoresError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(GROUPS).map_err(storage_err)?;
            let _ = write_txn.open_table(SUBJECTS).map_err(storage_err)?;
            let _ = write_txn.open_table(STUDENTS).map_err(storage_err)?;
            let _ = write_txn.open_table(METADATA).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        let read_txn = db.begin_read().map_err(storage_err)?;

        let (next_group_id, next_subject_id) = {
            let table = read_txn.open_table(METADATA).map_err(storage_err)?;
            let read = |key: &str| -> Result<u64, GScoresError> {
                Ok(table
                    .get(key)
                    .map_err(storage_err)?
                    .map(|v| v.value())
                    .unwrap_or(0))
            };
            (read(NEXT_GROUP_ID)?, read(NEXT_SUBJECT_ID)?)
        };

        let groups = {
            let table = read_txn.open_table(GROUPS).map_err(storage_err)?;
            let mut cache = BTreeMap::new();
            for entry in table.iter().map_err(storage_err)? {
                let (key, value) = entry.map_err(storage_err)?;
                let group: Group = decode(value.value())?;
                cache.insert(GroupId(key.value()), group);
            }
            cache
        };

        let subjects = {
            let table = read_txn.open_table(SUBJECTS).map_err(storage_err)?;
            let mut cache = BTreeMap::new();
            for entry in table.iter().map_err(storage_err)? {
                let (key, value) = entry.map_err(storage_err)?;
                let subject: Subject = decode(value.value())?;
                cache.insert(SubjectId(key.value()), subject);
            }
            cache
        };

        Ok(Self {
            db,
            groups,
            subjects,
            next_group_id,
            next_subject_id,
        })
    }

    /// Compact the database file (optional optimization, e.g. after a reset).
    pub fn compact(&mut self) -> Result<(), GScoresError> {
        self.db.compact().map_err(storage_err)?;
        Ok(())
    }
}

// =============================================================================
// SCORESTORE TRAIT IMPLEMENTATION
// =============================================================================

impl ScoreStore for RedbStore {
    fn upsert_group(&mut self, name: &str) -> Result<GroupId, GScoresError> {
        if let Some(existing) = self.group_by_name(name) {
            return Ok(existing.id);
        }

        let id = GroupId(self.next_group_id);
        let next = self.next_group_id.saturating_add(1);
        let group = Group {
            id,
            name: name.to_string(),
        };
        let bytes = encode(&group)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(GROUPS).map_err(storage_err)?;
            table.insert(id.0, bytes.as_slice()).map_err(storage_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(storage_err)?;
            meta.insert(NEXT_GROUP_ID, next).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        // Update in-memory state only after successful commit.
        self.next_group_id = next;
        self.groups.insert(id, group);
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
        let next = self.next_subject_id.saturating_add(1);
        let subject = Subject {
            id,
            code: code.to_string(),
            name: name.to_string(),
            group,
        };
        let bytes = encode(&subject)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(SUBJECTS).map_err(storage_err)?;
            table.insert(id.0, bytes.as_slice()).map_err(storage_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(storage_err)?;
            meta.insert(NEXT_SUBJECT_ID, next).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        self.next_subject_id = next;
        self.subjects.insert(id, subject);
        Ok(id)
    }

    /// Insert a batch of students in a single ACID transaction.
    ///
    /// In-batch duplicates and unknown subjects are rejected before the
    /// transaction opens. Duplicates against stored rows are detected inside
    /// the transaction; returning early drops it uncommitted, so nothing from
    /// the batch is written.
    fn insert_students(&mut self, students: &[Student]) -> Result<usize, GScoresError> {
        if students.is_empty() {
            return Ok(0);
        }

        let mut seen: BTreeSet<&CandidateId> = BTreeSet::new();
        let mut encoded = Vec::with_capacity(students.len());
        for student in students {
            if !seen.insert(&student.candidate_id) {
                return Err(GScoresError::DuplicateCandidate(
                    student.candidate_id.to_string(),
                ));
            }
            if let Some(entry) = student
                .scores
                .iter()
                .find(|entry| !self.subjects.contains_key(&entry.subject))
            {
                return Err(GScoresError::SubjectNotFound(entry.subject));
            }
            encoded.push((student.candidate_id.as_str(), encode(student)?));
        }

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(STUDENTS).map_err(storage_err)?;
            for (key, bytes) in &encoded {
                if table.get(*key).map_err(storage_err)?.is_some() {
                    return Err(GScoresError::DuplicateCandidate((*key).to_string()));
                }
                table.insert(*key, bytes.as_slice()).map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(encoded.len())
    }

    fn clear_students(&mut self) -> Result<(), GScoresError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        write_txn.delete_table(STUDENTS).map_err(storage_err)?;
        let _ = write_txn.open_table(STUDENTS).map_err(storage_err)?;
        write_txn.commit().map_err(storage_err)?;
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
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(storage_err)?;
        match table.get(candidate.as_str()).map_err(storage_err)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn contains_student(&self, candidate: &CandidateId) -> Result<bool, GScoresError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(storage_err)?;
        Ok(table.get(candidate.as_str()).map_err(storage_err)?.is_some())
    }

    fn for_each_student(&self, visit: &mut dyn FnMut(&Student)) -> Result<(), GScoresError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(storage_err)?;
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            let student: Student = decode(value.value())?;
            visit(&student);
        }
        Ok(())
    }

    fn student_count(&self) -> Result<usize, GScoresError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(storage_err)?;
        let count = table.len().map_err(storage_err)?;
        Ok(count as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
