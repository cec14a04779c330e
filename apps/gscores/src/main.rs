//! # G-Scores - Exam Results Server
//!
//! The main binary for the G-Scores national exam results service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) for the dashboard
//! - CLI interface for seeding and querying the dataset
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │              apps/gscores (THE BINARY)            │
//! │                                                   │
//! │   ┌─────────────┐    ┌─────────────┐   ┌────────┐ │
//! │   │   CLI       │    │   HTTP API  │   │ Config │ │
//! │   │  (clap)     │    │   (axum)    │   │ (toml) │ │
//! │   └──────┬──────┘    └──────┬──────┘   └───┬────┘ │
//! │          └──────────────────┼──────────────┘      │
//! │                             ▼                     │
//! │                    ┌────────────────┐             │
//! │                    │  gscores-core  │             │
//! │                    │  (THE LOGIC)   │             │
//! │                    └────────────────┘             │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Load the dataset, then serve it
//! gscores seed -f dataset/diem_thi_thpt_2024.csv
//! gscores server --host 0.0.0.0 --port 3000
//!
//! # CLI queries
//! gscores search 01000001
//! gscores report natural
//! gscores ranking --limit 20
//! ```

use clap::Parser;
use gscores::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. GSCORES_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GSCORES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "gscores=debug,gscores_core=debug,tower_http=debug"
    } else {
        "gscores=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the G-Scores startup banner.
fn print_banner() {
    println!(
        r#"
   ██████╗       ███████╗ ██████╗ ██████╗ ██████╗ ███████╗███████╗
  ██╔════╝       ██╔════╝██╔════╝██╔═══██╗██╔══██╗██╔════╝██╔════╝
  ██║  ███╗█████╗███████╗██║     ██║   ██║██████╔╝█████╗  ███████╗
  ██║   ██║╚════╝╚════██║██║     ██║   ██║██╔══██╗██╔══╝  ╚════██║
  ╚██████╔╝      ███████║╚██████╗╚██████╔╝██║  ██║███████╗███████║
   ╚═════╝       ╚══════╝ ╚═════╝ ╚═════╝ ╚═╝  ╚═╝╚══════╝╚══════╝

  Exam Results Server v{}

  Lookup • Reports • Ranking
"#,
        env!("CARGO_PKG_VERSION")
    );
}
