//! # G-Scores CLI Module
//!
//! This module implements the CLI interface for G-Scores.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `seed` - Load the exam CSV into the database
//! - `search` - Show one candidate's score sheet
//! - `report` - Score-band report for a group (or all subjects)
//! - `ranking` - Top students by math + physics + chemistry
//! - `status` - Show dataset counters
//! - `init` - Initialize new database

mod commands;

use crate::config::{BackendKind, Config};
use clap::{Parser, Subcommand};
use gscores_core::GScoresError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// G-Scores - national exam results lookup and statistics
///
/// Seeds the exam CSV into an embedded database and serves score lookup,
/// score-band reports and the leaderboard over HTTP or the command line.
#[derive(Parser, Debug)]
#[command(name = "gscores")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the score database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed from this CSV before serving (if the dataset is empty)
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Load the exam CSV into the database
    Seed {
        /// Path to the CSV file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Rows written per transaction
        #[arg(long)]
        batch_size: Option<usize>,

        /// Delete existing students before seeding
        #[arg(long)]
        reset: bool,
    },

    /// Show one candidate's score sheet
    Search {
        /// 8-character registration number
        candidate_id: String,
    },

    /// Score-band report for a subject group
    Report {
        /// Group name (core, foreign, natural, social); all subjects if omitted
        group: Option<String>,
    },

    /// Top students by math + physics + chemistry
    Ranking {
        /// Number of students to show (max 100)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show dataset status
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: file and environment first, then global CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, GScoresError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.storage.database.clone_from(database);
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GScoresError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port, seed }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config, seed.as_deref()).await
        }
        Some(Commands::Seed {
            file,
            batch_size,
            reset,
        }) => {
            if let Some(file) = file {
                config.seed.file = file;
            }
            if let Some(batch_size) = batch_size {
                config.seed.batch_size = batch_size;
            }
            cmd_seed(&config, json_mode, reset)
        }
        Some(Commands::Search { candidate_id }) => cmd_search(&config, json_mode, &candidate_id),
        Some(Commands::Report { group }) => cmd_report(&config, json_mode, group.as_deref()),
        Some(Commands::Ranking { limit }) => cmd_ranking(&config, json_mode, limit),
        Some(Commands::Status) => cmd_status(&config, json_mode),
        Some(Commands::Init { force }) => cmd_init(&config, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
