//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, RankedStudentResponse, ScoreSheetResponse, SubjectReportResponse};
use crate::config::{BackendKind, Config};
use gscores_core::{GScoresError, Repository, SeedEvent, SeedReport};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Seed progress is logged at info level each time this many students land.
const PROGRESS_EVERY_STUDENTS: usize = 10_000;

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it is a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, GScoresError> {
    let canonical = path.canonicalize().map_err(|e| {
        GScoresError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(GScoresError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
///
/// With `seed`, or with the memory backend, the dataset is seeded from CSV
/// first when it is still empty.
pub async fn cmd_server(config: &Config, seed: Option<&Path>) -> Result<(), GScoresError> {
    let repository = open_server_repository(config, seed)?;

    let metrics = repository.metrics()?;
    if !metrics.is_seeded() {
        tracing::warn!("Dataset is empty. Run `gscores seed` or start with --seed <csv>");
    }

    println!("G-Scores Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Backend:  {}", config.storage.backend);
    println!("  Database: {:?}", config.storage.database);
    println!("  Students: {}", metrics.students);
    println!();
    println!("Endpoints:");
    println!("  GET /student/search-scores/{{candidateId}} - Score sheet");
    println!("  GET /student/report/{{groupName}}          - Score-band report");
    println!("  GET /student/ranking                     - Top 10 (math + physics + chemistry)");
    println!("  GET /status                              - Dataset status");
    println!("  GET /health                              - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.server, repository).await
}

// =============================================================================
// SEED COMMAND
// =============================================================================

/// Load the configured CSV into the database.
pub fn cmd_seed(config: &Config, json_mode: bool, reset: bool) -> Result<(), GScoresError> {
    let mut repository = open_repository(config)?;

    if reset {
        tracing::info!("Resetting dataset before seeding");
        repository.reset()?;
    }

    let report = seed_from_file(&mut repository, &config.seed.file, config.seed.batch_size)?;

    if json_mode {
        let output = serde_json::json!({
            "file": config.seed.file.to_string_lossy(),
            "rows_read": report.rows_read,
            "inserted": report.inserted,
            "skipped": report.skipped,
            "batches": report.batches,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Seeded {:?}", config.seed.file);
    println!("  Rows read: {}", report.rows_read);
    println!("  Inserted:  {}", report.inserted);
    println!("  Skipped:   {}", report.skipped);
    println!("  Batches:   {}", report.batches);

    if config.storage.backend == BackendKind::Memory {
        println!();
        println!("Note: memory backend selected, nothing was persisted.");
    }

    Ok(())
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Show one candidate's score sheet.
pub fn cmd_search(
    config: &Config,
    json_mode: bool,
    candidate_id: &str,
) -> Result<(), GScoresError> {
    let repository = open_query_repository(config)?;
    let sheet = repository.search_scores(candidate_id)?;

    if json_mode {
        let output = ScoreSheetResponse::from(sheet);
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Candidate: {}", sheet.candidate_id);
    println!(
        "Language:  {}",
        sheet.foreign_language_id.as_deref().unwrap_or("-")
    );
    println!();
    for line in &sheet.subjects {
        match line.score {
            Some(score) => println!("  {:<12} {:>5}", line.name, score.to_string()),
            None => println!("  {:<12} {:>5}", line.name, "-"),
        }
    }

    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Score-band report for a group, or all subjects.
pub fn cmd_report(
    config: &Config,
    json_mode: bool,
    group: Option<&str>,
) -> Result<(), GScoresError> {
    let repository = open_query_repository(config)?;
    let report = repository.score_report(group)?;

    if json_mode {
        let output: Vec<SubjectReportResponse> = report.into_iter().map(Into::into).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Score Report: {}", group.unwrap_or("all subjects"));
    println!("=============");
    println!(
        "  {:<12} {:>10} {:>10} {:>10} {:>10}",
        "Subject", ">= 8", "6 - 8", "4 - 6", "< 4"
    );
    for row in &report {
        println!(
            "  {:<12} {:>10} {:>10} {:>10} {:>10}",
            row.subject,
            row.counts.excellent,
            row.counts.good,
            row.counts.average,
            row.counts.poor
        );
    }

    Ok(())
}

// =============================================================================
// RANKING COMMAND
// =============================================================================

/// Top students by math + physics + chemistry.
pub fn cmd_ranking(config: &Config, json_mode: bool, limit: usize) -> Result<(), GScoresError> {
    let repository = open_query_repository(config)?;
    let top = repository.top_ranking(limit)?;

    if json_mode {
        let output: Vec<RankedStudentResponse> = top.into_iter().map(Into::into).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Ranking (math + physics + chemistry)");
    println!("====================================");
    if top.is_empty() {
        println!("  (no ranked students)");
    }
    for (rank, row) in top.iter().enumerate() {
        println!(
            "  {:>3}. {}  {:>5} {:>5} {:>5}  = {}",
            rank + 1,
            row.candidate_id,
            row.math.to_string(),
            row.physics.to_string(),
            row.chemistry.to_string(),
            row.total
        );
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show dataset status.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), GScoresError> {
    let repository = open_query_repository(config)?;
    let metrics = repository.metrics()?;

    if json_mode {
        let output = serde_json::json!({
            "database": config.storage.database.to_string_lossy(),
            "backend": config.storage.backend.to_string(),
            "groups": metrics.groups,
            "subjects": metrics.subjects,
            "students": metrics.students,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("G-Scores Dataset Status");
    println!("=======================");
    println!("Database: {:?}", config.storage.database);
    println!("Backend:  {}", config.storage.backend);
    println!();
    println!("Groups:   {}", metrics.groups);
    println!("Subjects: {}", metrics.subjects);
    println!("Students: {}", metrics.students);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), GScoresError> {
    let db_path = &config.storage.database;

    if config.storage.backend == BackendKind::Memory {
        println!("Memory backend selected, nothing to initialize");
        return Ok(());
    }

    if db_path.exists() {
        if !force {
            return Err(GScoresError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path).map_err(|e| {
            GScoresError::IoError(format!("Cannot remove '{}': {}", db_path.display(), e))
        })?;
    }

    let _repository = Repository::with_redb(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the repository for the configured backend.
pub fn open_repository(config: &Config) -> Result<Repository, GScoresError> {
    match config.storage.backend {
        BackendKind::Redb => Repository::with_redb(&config.storage.database),
        BackendKind::Memory => Ok(Repository::new()),
    }
}

/// Open the repository for a read command.
///
/// A memory store starts empty, so it is seeded from the configured CSV
/// first when that file exists.
fn open_query_repository(config: &Config) -> Result<Repository, GScoresError> {
    let mut repository = open_repository(config)?;
    if config.storage.backend == BackendKind::Memory {
        if config.seed.file.is_file() {
            seed_from_file(&mut repository, &config.seed.file, config.seed.batch_size)?;
        } else {
            tracing::warn!(
                "Memory backend with no CSV at {:?}, dataset is empty",
                config.seed.file
            );
        }
    }
    Ok(repository)
}

/// Open the repository served over HTTP.
///
/// An explicit `seed` file must exist. The memory backend falls back to the
/// configured CSV and starts empty when that file is missing.
fn open_server_repository(
    config: &Config,
    seed: Option<&Path>,
) -> Result<Repository, GScoresError> {
    let mut repository = open_repository(config)?;

    let seed_file = match (seed, config.storage.backend) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, BackendKind::Memory) if config.seed.file.is_file() => {
            Some(config.seed.file.clone())
        }
        (None, BackendKind::Memory) => {
            tracing::warn!(
                "Memory backend with no CSV at {:?}, dataset is empty",
                config.seed.file
            );
            None
        }
        (None, BackendKind::Redb) => None,
    };
    if let Some(path) = seed_file {
        let existing = repository.metrics()?;
        if existing.is_seeded() {
            tracing::info!(
                "Dataset already holds {} students, skipping seed from {:?}",
                existing.students,
                path
            );
        } else {
            seed_from_file(&mut repository, &path, config.seed.batch_size)?;
        }
    }
    Ok(repository)
}

/// Stream a CSV file into the repository, logging progress.
pub fn seed_from_file(
    repository: &mut Repository,
    path: &Path,
    batch_size: usize,
) -> Result<SeedReport, GScoresError> {
    let validated_path = validate_file_path(path)?;
    let file = std::fs::File::open(&validated_path)
        .map_err(|e| GScoresError::IoError(format!("Open {:?}: {}", validated_path, e)))?;

    tracing::info!("Seeding from {:?} (batch size {})", validated_path, batch_size);

    let report = repository.seed(BufReader::new(file), batch_size, &mut log_seed_event)?;

    tracing::info!(
        "Seed complete: {} inserted, {} skipped, {} batches",
        report.inserted,
        report.skipped,
        report.batches
    );
    Ok(report)
}

fn log_seed_event(event: &SeedEvent) {
    match event {
        SeedEvent::CatalogInstalled { groups, subjects } => {
            tracing::info!("Catalog ready: {} groups, {} subjects", groups, subjects);
        }
        SeedEvent::BatchInserted { inserted, total } => {
            let before = total.saturating_sub(*inserted);
            if total / PROGRESS_EVERY_STUDENTS > before / PROGRESS_EVERY_STUDENTS {
                tracing::info!("Inserted {} students", total);
            } else {
                tracing::debug!("Inserted batch of {} ({} total)", inserted, total);
            }
        }
        SeedEvent::RowSkipped { line, reason } => {
            tracing::warn!("Skipping line {}: {}", line, reason);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
