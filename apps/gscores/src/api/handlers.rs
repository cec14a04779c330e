//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Queries scan the store synchronously, so each one runs on the blocking
//! thread pool rather than on the async executor.

use super::{
    AppState,
    types::{
        ErrorResponse, HealthResponse, RankedStudentResponse, ScoreSheetResponse, StatusResponse,
        SubjectReportResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use gscores_core::{GScoresError, Repository, primitives::DEFAULT_RANKING_LIMIT};
use std::sync::Arc;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Handler result carrying a JSON body on success.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Build an error response with the given status.
fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(status.as_u16(), message)))
}

/// Map a core error to an HTTP error.
///
/// Not-found errors become 404, bad input 400. Anything else is a server
/// fault: it is logged and the client gets a generic 500.
fn map_error(error: GScoresError) -> ApiError {
    if error.is_not_found() {
        api_error(StatusCode::NOT_FOUND, error.to_string())
    } else if error.is_invalid_input() {
        api_error(StatusCode::BAD_REQUEST, error.to_string())
    } else {
        tracing::error!("Query failed: {}", error);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

/// Run a repository query on the blocking pool.
async fn run_query<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Repository) -> Result<T, GScoresError> + Send + 'static,
{
    let repository = Arc::clone(&state.repository);
    match tokio::task::spawn_blocking(move || query(&repository)).await {
        Ok(result) => result.map_err(map_error),
        Err(e) => {
            tracing::error!("Query task failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get dataset counters.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let metrics = run_query(&state, Repository::metrics).await?;
    Ok(Json(metrics.into()))
}

// =============================================================================
// SEARCH HANDLER
// =============================================================================

/// Look up one candidate's score sheet.
pub async fn search_scores_handler(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> ApiResult<ScoreSheetResponse> {
    let sheet = run_query(&state, move |repo| repo.search_scores(&candidate_id)).await?;
    Ok(Json(sheet.into()))
}

// =============================================================================
// REPORT HANDLERS
// =============================================================================

/// Score-band report for one subject group.
pub async fn group_report_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> ApiResult<Vec<SubjectReportResponse>> {
    let report = run_query(&state, move |repo| repo.score_report(Some(&group_name))).await?;
    Ok(Json(report.into_iter().map(Into::into).collect()))
}

/// Score-band report over every subject.
pub async fn full_report_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<SubjectReportResponse>> {
    let report = run_query(&state, |repo| repo.score_report(None)).await?;
    Ok(Json(report.into_iter().map(Into::into).collect()))
}

// =============================================================================
// RANKING HANDLER
// =============================================================================

/// Top students by math + physics + chemistry.
pub async fn ranking_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<RankedStudentResponse>> {
    let top = run_query(&state, |repo| repo.top_ranking(DEFAULT_RANKING_LIMIT)).await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

// =============================================================================
// FALLBACK
// =============================================================================

/// JSON 404 for unknown routes.
pub async fn not_found_handler(uri: Uri) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Cannot GET {}", uri.path()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gscores_core::SubjectId;

    #[test]
    fn not_found_family_maps_to_404() {
        for error in [
            GScoresError::CandidateNotFound("01000001".to_string()),
            GScoresError::GroupNotFound("arts".to_string()),
            GScoresError::NoSubjects("arts".to_string()),
        ] {
            let (status, Json(body)) = map_error(error);
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body.status_code, 404);
        }
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let (status, Json(body)) = map_error(GScoresError::InvalidCandidateId("12".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("12"));
    }

    #[test]
    fn storage_faults_map_to_500_without_detail() {
        for error in [
            GScoresError::IoError("disk on fire".to_string()),
            GScoresError::SubjectNotFound(SubjectId(7)),
        ] {
            let (status, Json(body)) = map_error(error);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body.message, "Internal server error");
        }
    }
}
