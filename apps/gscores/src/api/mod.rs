//! # G-Scores HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /student/search-scores/{candidateId}` - Score sheet of one candidate
//! - `GET /student/report/{groupName}` - Score-band report for a subject group
//! - `GET /student/report` - Score-band report over every subject
//! - `GET /student/ranking` - Top 10 by math + physics + chemistry
//! - `GET /status` - Dataset counters
//! - `GET /health` - Health check
//!
//! ## Security Configuration
//!
//! - CORS origins: `[server] cors_origins` or `GSCORES_CORS_ORIGINS`
//!   (comma-separated, "*" for all, default: localhost dev origins only)
//! - Rate limit: `[server] rate_limit` or `GSCORES_RATE_LIMIT`
//!   (requests per second, default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use handlers::{
    full_report_handler, group_report_handler, health_handler, not_found_handler,
    ranking_handler, search_scores_handler, status_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ErrorResponse, HealthResponse, RankedStudentResponse, ScoreSheetResponse, StatusResponse,
    SubjectReportResponse, SubjectScoreJson,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use gscores_core::{GScoresError, Repository};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// The dataset is read-only while serving, so the repository is shared
/// without a lock.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Repository>,
}

impl AppState {
    /// Create new app state around a repository.
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Origins the dashboard is served from during local development.
const LOCALHOST_ORIGINS: [&str; 6] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:8080",
];

/// Build the CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins
/// - empty: localhost dev origins only
/// - otherwise: exactly the listed origins (invalid entries are skipped)
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }
    if origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        build_localhost_cors()
    } else {
        read_only_cors(allowed)
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = LOCALHOST_ORIGINS
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();
    read_only_cors(origins)
}

fn read_only_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - global token bucket (if enabled)
pub fn create_router(state: AppState, settings: &ServerConfig) -> Router {
    let cors = build_cors_layer(&settings.cors_origins);

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/student/search-scores/{candidate_id}",
            get(handlers::search_scores_handler),
        )
        .route("/student/report", get(handlers::full_report_handler))
        .route(
            "/student/report/{group_name}",
            get(handlers::group_report_handler),
        )
        .route("/student/ranking", get(handlers::ranking_handler))
        .fallback(handlers::not_found_handler);

    if settings.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            settings.rate_limit
        );
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(settings.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(
    settings: &ServerConfig,
    repository: Repository,
) -> Result<(), GScoresError> {
    let addr = settings.addr();
    let router = create_router(AppState::new(repository), settings);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GScoresError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("G-Scores HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GScoresError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
