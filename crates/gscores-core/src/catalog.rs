//! # Subject Catalog
//!
//! The fixed set of subject groups and subjects of the national exam.
//!
//! The order of `SUBJECTS` is the order of the score columns in the seed CSV
//! and the order of entries on every student's score sheet.

use crate::store::ScoreStore;
use crate::{GScoresError, SubjectId};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// GROUPS
// =============================================================================

/// The four subject groups used for report filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupName {
    Core,
    Foreign,
    Natural,
    Social,
}

impl GroupName {
    /// All groups, in installation order.
    pub const ALL: [GroupName; 4] = [Self::Core, Self::Foreign, Self::Natural, Self::Social];

    /// The stored (and URL) name of the group.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Foreign => "foreign",
            Self::Natural => "natural",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupName {
    type Err = GScoresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| GScoresError::GroupNotFound(s.to_string()))
    }
}

// =============================================================================
// SUBJECTS
// =============================================================================

/// Static description of one exam subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub group: GroupName,
}

/// Every exam subject, in CSV column order.
pub const SUBJECTS: [SubjectSpec; 9] = [
    SubjectSpec {
        code: "toan",
        name: "Toán",
        group: GroupName::Core,
    },
    SubjectSpec {
        code: "ngu_van",
        name: "Ngữ Văn",
        group: GroupName::Core,
    },
    SubjectSpec {
        code: "ngoai_ngu",
        name: "Ngoại Ngữ",
        group: GroupName::Foreign,
    },
    SubjectSpec {
        code: "vat_li",
        name: "Vật Lý",
        group: GroupName::Natural,
    },
    SubjectSpec {
        code: "hoa_hoc",
        name: "Hóa Học",
        group: GroupName::Natural,
    },
    SubjectSpec {
        code: "sinh_hoc",
        name: "Sinh Học",
        group: GroupName::Natural,
    },
    SubjectSpec {
        code: "lich_su",
        name: "Lịch Sử",
        group: GroupName::Social,
    },
    SubjectSpec {
        code: "dia_li",
        name: "Địa Lý",
        group: GroupName::Social,
    },
    SubjectSpec {
        code: "gdcd",
        name: "GDCD",
        group: GroupName::Social,
    },
];

/// Subject codes summed for the leaderboard: math, physics, chemistry.
pub const RANKING_SUBJECTS: [&str; 3] = ["toan", "vat_li", "hoa_hoc"];

// =============================================================================
// INSTALLATION
// =============================================================================

/// Subject ids resolved from a store, in CSV column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIds {
    columns: Vec<SubjectId>,
}

impl CatalogIds {
    /// Subject id for each score column.
    #[must_use]
    pub fn columns(&self) -> &[SubjectId] {
        &self.columns
    }
}

/// Upsert every group and subject into the store.
///
/// Idempotent: running it on an already installed store returns the same ids.
pub fn install<S: ScoreStore + ?Sized>(store: &mut S) -> Result<CatalogIds, GScoresError> {
    for group in GroupName::ALL {
        store.upsert_group(group.as_str())?;
    }

    let mut columns = Vec::with_capacity(SUBJECTS.len());
    for spec in &SUBJECTS {
        let group = store
            .group_by_name(spec.group.as_str())
            .ok_or_else(|| GScoresError::GroupNotFound(spec.group.to_string()))?;
        columns.push(store.upsert_subject(spec.code, spec.name, group.id)?);
    }

    Ok(CatalogIds { columns })
}

// =============================================================================
// TESTS
// =============================================================================
