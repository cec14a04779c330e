//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Field names are camelCase to match what the dashboard consumes. Scores
//! are emitted as JSON numbers in points (`8.25`), converted from the
//! fixed-point values only at this boundary.

use gscores_core::{DatasetMetrics, RankedStudent, ScoreSheet, SubjectReport, SubjectScore};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Dataset status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub groups: usize,
    pub subjects: usize,
    pub students: usize,
}

impl From<DatasetMetrics> for StatusResponse {
    fn from(metrics: DatasetMetrics) -> Self {
        Self {
            groups: metrics.groups,
            subjects: metrics.subjects,
            students: metrics.students,
        }
    }
}

// =============================================================================
// SCORE SHEET
// =============================================================================

/// One subject line on a score sheet. `score` is null when not taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScoreJson {
    pub name: String,
    pub score: Option<f64>,
}

impl From<SubjectScore> for SubjectScoreJson {
    fn from(line: SubjectScore) -> Self {
        Self {
            name: line.name,
            score: line.score.map(|s| s.points()),
        }
    }
}

/// `GET /student/search-scores/{candidateId}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheetResponse {
    pub candidate_id: String,
    pub foreign_language_id: Option<String>,
    pub subjects: Vec<SubjectScoreJson>,
}

impl From<ScoreSheet> for ScoreSheetResponse {
    fn from(sheet: ScoreSheet) -> Self {
        Self {
            candidate_id: sheet.candidate_id.to_string(),
            foreign_language_id: sheet.foreign_language_id,
            subjects: sheet.subjects.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// SCORE REPORT
// =============================================================================

/// One subject row of `GET /student/report/{groupName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectReportResponse {
    pub subject: String,
    pub excellent: u64,
    pub good: u64,
    pub average: u64,
    pub poor: u64,
}

impl From<SubjectReport> for SubjectReportResponse {
    fn from(report: SubjectReport) -> Self {
        Self {
            subject: report.subject,
            excellent: report.counts.excellent,
            good: report.counts.good,
            average: report.counts.average,
            poor: report.counts.poor,
        }
    }
}

// =============================================================================
// RANKING
// =============================================================================

/// One row of `GET /student/ranking`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStudentResponse {
    pub candidate_id: String,
    pub math: f64,
    pub physics: f64,
    pub chemistry: f64,
    pub total_score: f64,
}

impl From<RankedStudent> for RankedStudentResponse {
    fn from(row: RankedStudent) -> Self {
        Self {
            candidate_id: row.candidate_id.to_string(),
            math: row.math.points(),
            physics: row.physics.points(),
            chemistry: row.chemistry.points(),
            total_score: row.total.points(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error body for every non-2xx response produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    /// Create an error body.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}
