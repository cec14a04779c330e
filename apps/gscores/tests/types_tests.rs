//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use gscores::api::{
    ErrorResponse, HealthResponse, RankedStudentResponse, ScoreSheetResponse, StatusResponse,
    SubjectReportResponse, SubjectScoreJson,
};
use gscores_core::{
    BandCounts, CandidateId, DatasetMetrics, RankedStudent, Score, ScoreSheet, SubjectReport,
    SubjectScore, TotalScore,
};
use serde_json::json;

fn score(raw: &str) -> Score {
    Score::parse(raw).unwrap()
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_from_metrics() {
    let status = StatusResponse::from(DatasetMetrics {
        groups: 4,
        subjects: 9,
        students: 1_061_605,
    });

    assert_eq!(
        serde_json::to_value(status).unwrap(),
        json!({ "groups": 4, "subjects": 9, "students": 1_061_605 })
    );
}

// =============================================================================
// SCORE SHEET TESTS
// =============================================================================

#[test]
fn test_score_sheet_is_camel_case_with_null_scores() {
    let sheet = ScoreSheet {
        candidate_id: CandidateId::parse("01000001").unwrap(),
        foreign_language_id: Some("N1".to_string()),
        subjects: vec![
            SubjectScore {
                name: "Toán".to_string(),
                score: Some(score("8.4")),
            },
            SubjectScore {
                name: "Vật Lý".to_string(),
                score: None,
            },
        ],
    };

    let value = serde_json::to_value(ScoreSheetResponse::from(sheet)).unwrap();
    assert_eq!(
        value,
        json!({
            "candidateId": "01000001",
            "foreignLanguageId": "N1",
            "subjects": [
                { "name": "Toán", "score": 8.4 },
                { "name": "Vật Lý", "score": null }
            ]
        })
    );
}

#[test]
fn test_score_sheet_without_language_is_null() {
    let response = ScoreSheetResponse {
        candidate_id: "01000003".to_string(),
        foreign_language_id: None,
        subjects: vec![SubjectScoreJson {
            name: "GDCD".to_string(),
            score: Some(10.0),
        }],
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"foreignLanguageId\":null"));
    assert!(json.contains("\"score\":10.0"));
}

// =============================================================================
// REPORT TESTS
// =============================================================================

#[test]
fn test_subject_report_flattens_counts() {
    let report = SubjectReport {
        subject: "Hóa Học".to_string(),
        counts: BandCounts {
            excellent: 10,
            good: 20,
            average: 30,
            poor: 40,
        },
    };

    assert_eq!(
        serde_json::to_value(SubjectReportResponse::from(report)).unwrap(),
        json!({ "subject": "Hóa Học", "excellent": 10, "good": 20, "average": 30, "poor": 40 })
    );
}

// =============================================================================
// RANKING TESTS
// =============================================================================

#[test]
fn test_ranked_student_uses_points() {
    let (m, p, c) = (score("9.5"), score("9.25"), score("9.75"));
    let row = RankedStudent {
        candidate_id: CandidateId::parse("01000002").unwrap(),
        math: m,
        physics: p,
        chemistry: c,
        total: TotalScore::sum(&[m, p, c]),
    };

    assert_eq!(
        serde_json::to_value(RankedStudentResponse::from(row)).unwrap(),
        json!({
            "candidateId": "01000002",
            "math": 9.5,
            "physics": 9.25,
            "chemistry": 9.75,
            "totalScore": 28.5
        })
    );
}

// =============================================================================
// ERROR RESPONSE TESTS
// =============================================================================

#[test]
fn test_error_response_shape() {
    let error = ErrorResponse::new(404, "Candidate not found: 09999999");
    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        json!({ "statusCode": 404, "message": "Candidate not found: 09999999" })
    );

    let back: ErrorResponse = serde_json::from_value(json!({
        "statusCode": 400,
        "message": "bad"
    }))
    .unwrap();
    assert_eq!(back.status_code, 400);
}
