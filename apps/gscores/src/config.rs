//! # Configuration Module
//!
//! Runtime settings for the server and CLI.
//!
//! Precedence, highest first: CLI flag, environment variable, TOML file,
//! built-in default. CLI flags are applied by the caller after [`Config::load`].
//!
//! ## Environment Variables
//!
//! - `GSCORES_CONFIG`: path of the TOML file (when `--config` is not given)
//! - `GSCORES_CORS_ORIGINS`: comma-separated origins, or "*" for all
//! - `GSCORES_RATE_LIMIT`: requests per second (0 disables)

use clap::ValueEnum;
use gscores_core::GScoresError;
use gscores_core::primitives::{DEFAULT_BATCH_SIZE, DEFAULT_DATASET_PATH};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "GSCORES_CONFIG";

/// Env var overriding the allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "GSCORES_CORS_ORIGINS";

/// Env var overriding the rate limit.
pub const RATE_LIMIT_ENV: &str = "GSCORES_RATE_LIMIT";

/// Config file picked up from the working directory when nothing else is set.
pub const DEFAULT_CONFIG_FILE: &str = "gscores.toml";

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// SETTINGS
// =============================================================================

/// Which store backs the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// redb database file (ACID, persistent).
    #[default]
    Redb,
    /// In-memory store, seeded from CSV on every start.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Redb => "redb",
            Self::Memory => "memory",
        })
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means localhost dev origins only.
    pub cors_origins: Vec<String>,
    /// Requests per second, 0 disables rate limiting.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: PathBuf,
    pub backend: BackendKind,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("gscores.db"),
            backend: BackendKind::default(),
        }
    }
}

/// `[seed]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub file: PathBuf,
    pub batch_size: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_DATASET_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub seed: SeedConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, GScoresError> {
        toml::from_str(text)
            .map_err(|e| GScoresError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, GScoresError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GScoresError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the effective configuration, minus CLI overrides.
    ///
    /// The file is `explicit` if given, else `$GSCORES_CONFIG`, else
    /// `gscores.toml` when it exists. An explicitly named file must exist.
    /// Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self, GScoresError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::from_file(&path)?
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!("Loading config from {:?}", fallback);
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `GSCORES_CORS_ORIGINS` and `GSCORES_RATE_LIMIT` if set.
    ///
    /// An unparsable rate limit is ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(origins) = std::env::var(CORS_ORIGINS_ENV) {
            self.server.cors_origins = parse_origin_list(&origins);
        }
        if let Ok(raw) = std::env::var(RATE_LIMIT_ENV) {
            match raw.trim().parse() {
                Ok(rate) => self.server.rate_limit = rate,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", RATE_LIMIT_ENV, raw),
            }
        }
    }
}

/// Split a comma-separated origin list, dropping empty entries.
#[must_use]
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "127.0.0.1:3000");
        assert_eq!(config.server.rate_limit, 100);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.storage.backend, BackendKind::Redb);
        assert_eq!(config.seed.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.seed.file, PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn full_document() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            cors_origins = ["http://localhost:5173"]
            rate_limit = 0

            [storage]
            database = "/var/lib/gscores.db"
            backend = "memory"

            [seed]
            file = "scores.csv"
            batch_size = 1000
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.server.rate_limit, 0);
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.seed.batch_size, 1000);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = Config::from_toml_str("[server]\nport = 4000\n").expect("parse");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn invalid_document_is_rejected() {
        let result = Config::from_toml_str("[storage]\nbackend = \"sqlite\"\n");
        assert!(matches!(result, Err(GScoresError::SerializationError(_))));
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gscores.toml");
        std::fs::write(&path, "[seed]\nbatch_size = 42\n").expect("write");

        let config = Config::from_file(&path).expect("load");
        assert_eq!(config.seed.batch_size, 42);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn origin_list_parsing() {
        assert_eq!(
            parse_origin_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(parse_origin_list("*"), vec!["*"]);
        assert!(parse_origin_list("").is_empty());
    }
}
